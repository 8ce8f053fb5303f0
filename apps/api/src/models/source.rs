use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Container format the source was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Pptx,
    Pdf,
}

/// How far the extracted structure can be trusted. Report annotation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    High,
    Medium,
}

impl SourceType {
    pub fn reliability(self) -> Reliability {
        match self {
            SourceType::Pptx => Reliability::High,
            // layout is inferred from drawn content, not from placeholders
            SourceType::Pdf => Reliability::Medium,
        }
    }
}

/// Structural fingerprint of one source page, independent of its exact content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSignature {
    pub has_title: bool,
    pub bullet_count: u32,
    pub column_count: u32,
    pub image_count: u32,
    pub has_table: bool,
    pub image_coverage_ratio: f64,
    pub text_coverage_ratio: f64,
}

impl Default for PageSignature {
    fn default() -> Self {
        Self {
            has_title: false,
            bullet_count: 0,
            column_count: 1,
            image_count: 0,
            has_table: false,
            image_coverage_ratio: 0.0,
            text_coverage_ratio: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePage {
    pub index: usize,
    pub signature: PageSignature,
    /// Extraction-time anomalies, e.g. low-confidence OCR.
    #[serde(default)]
    pub warnings: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub source_id: Uuid,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub pages: Vec<SourcePage>,
    pub created_at: DateTime<Utc>,
}

impl Source {
    pub fn page_warning_count(&self) -> u32 {
        self.pages.iter().map(|p| p.warnings.len() as u32).sum()
    }
}
