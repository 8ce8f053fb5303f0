// Template & source ingest.
// Raw bytes go through the pluggable extraction collaborators, their output is
// validated, stamped with a fresh id and becomes immutable.

pub mod catalog;
pub mod handlers;
pub mod signature;
pub mod validation;

use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::ingest::catalog::LayoutCatalogBuilder;
use crate::ingest::signature::SignatureExtractor;
use crate::ingest::validation::{validate_source, validate_template};
use crate::models::{Source, Template};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not decode collaborator output: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("layout id must not be empty")]
    EmptyLayoutId,

    #[error("duplicate layout id '{0}'")]
    DuplicateLayoutId(String),

    #[error("page at position {position} carries index {index}")]
    PageIndexMismatch { position: usize, index: usize },

    #[error("page {index}: column_count must be at least 1")]
    InvalidColumnCount { index: usize },

    #[error("page {index}: {field} = {value} is outside [0, 1]")]
    RatioOutOfRange {
        index: usize,
        field: &'static str,
        value: f64,
    },
}

pub async fn ingest_template(
    builder: &dyn LayoutCatalogBuilder,
    bytes: &[u8],
) -> Result<Template, IngestError> {
    let descriptor = builder.build(bytes).await?;
    validate_template(&descriptor)?;

    let template = Template {
        template_id: Uuid::new_v4(),
        theme_meta: descriptor.theme_meta.with_default_accents(),
        layouts: descriptor.layouts,
        created_at: Utc::now(),
    };
    info!(
        "Ingested template {} with {} layouts",
        template.template_id,
        template.layouts.len()
    );
    Ok(template)
}

pub async fn ingest_source(
    extractor: &dyn SignatureExtractor,
    bytes: &[u8],
) -> Result<Source, IngestError> {
    let descriptor = extractor.extract(bytes).await?;
    validate_source(&descriptor)?;

    let source = Source {
        source_id: Uuid::new_v4(),
        source_type: descriptor.source_type,
        pages: descriptor.pages,
        created_at: Utc::now(),
    };
    info!(
        "Ingested {:?} source {} with {} pages ({} extraction warnings)",
        source.source_type,
        source.source_id,
        source.pages.len(),
        source.page_warning_count()
    );
    Ok(source)
}
