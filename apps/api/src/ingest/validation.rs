use std::collections::HashSet;

use crate::ingest::catalog::TemplateDescriptor;
use crate::ingest::signature::SourceDescriptor;
use crate::ingest::IngestError;

/// Layout ids must be non-empty and unique within the template.
/// An empty catalog is accepted here; planning rejects it later.
pub fn validate_template(descriptor: &TemplateDescriptor) -> Result<(), IngestError> {
    let mut seen = HashSet::new();
    for layout in &descriptor.layouts {
        if layout.layout_id.trim().is_empty() {
            return Err(IngestError::EmptyLayoutId);
        }
        if !seen.insert(layout.layout_id.as_str()) {
            return Err(IngestError::DuplicateLayoutId(layout.layout_id.clone()));
        }
    }
    Ok(())
}

/// Pages must be in document order with contiguous 0-based indexes and sane signatures.
pub fn validate_source(descriptor: &SourceDescriptor) -> Result<(), IngestError> {
    for (position, page) in descriptor.pages.iter().enumerate() {
        if page.index != position {
            return Err(IngestError::PageIndexMismatch {
                position,
                index: page.index,
            });
        }
        let sig = &page.signature;
        if sig.column_count == 0 {
            return Err(IngestError::InvalidColumnCount { index: position });
        }
        check_ratio(position, "image_coverage_ratio", sig.image_coverage_ratio)?;
        check_ratio(position, "text_coverage_ratio", sig.text_coverage_ratio)?;
    }
    Ok(())
}

fn check_ratio(index: usize, field: &'static str, value: f64) -> Result<(), IngestError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(IngestError::RatioOutOfRange {
            index,
            field,
            value,
        })
    }
}
