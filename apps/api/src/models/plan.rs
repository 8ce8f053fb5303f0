use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named structural mismatch between a page and its assigned layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
    MissingTitlePlaceholder,
    NoBodyPlaceholder,
    OverflowBullets,
    OverflowImages,
    NoTablePlaceholder,
    ColumnMismatch,
    /// No layout in the catalog adequately serves the page.
    LowFit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Fatal,
}

impl Issue {
    pub fn severity(self) -> Severity {
        match self {
            Issue::MissingTitlePlaceholder
            | Issue::NoBodyPlaceholder
            | Issue::OverflowBullets
            | Issue::OverflowImages
            | Issue::NoTablePlaceholder
            | Issue::ColumnMismatch => Severity::Warning,
            Issue::LowFit => Severity::Fatal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Issue::MissingTitlePlaceholder => "missing_title_placeholder",
            Issue::NoBodyPlaceholder => "no_body_placeholder",
            Issue::OverflowBullets => "overflow_bullets",
            Issue::OverflowImages => "overflow_images",
            Issue::NoTablePlaceholder => "no_table_placeholder",
            Issue::ColumnMismatch => "column_mismatch",
            Issue::LowFit => "low_fit",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic-light classification of a single slide mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideHealth {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideMapping {
    pub index: usize,
    pub chosen_layout_id: String,
    pub score: f64,
    pub issues: BTreeSet<Issue>,
    /// True once the layout was picked by hand through a swap.
    #[serde(default)]
    pub manual: bool,
}

impl SlideMapping {
    pub fn health(&self) -> SlideHealth {
        match self.issues.iter().map(|i| i.severity()).max() {
            None => SlideHealth::Green,
            Some(Severity::Warning) => SlideHealth::Yellow,
            Some(Severity::Fatal) => SlideHealth::Red,
        }
    }
}

/// Page→layout assignments for one source against one template.
///
/// References its template and source by id only. `slides` is index-aligned
/// with the source pages for the plan's whole lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: Uuid,
    pub template_id: Uuid,
    pub source_id: Uuid,
    pub slides: Vec<SlideMapping>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(issues: &[Issue]) -> SlideMapping {
        SlideMapping {
            index: 0,
            chosen_layout_id: "layout_0".to_string(),
            score: 0.5,
            issues: issues.iter().copied().collect(),
            manual: false,
        }
    }

    #[test]
    fn test_health_green_when_no_issues() {
        assert_eq!(mapping(&[]).health(), SlideHealth::Green);
    }

    #[test]
    fn test_health_yellow_for_warnings_only() {
        let m = mapping(&[Issue::OverflowBullets, Issue::NoTablePlaceholder]);
        assert_eq!(m.health(), SlideHealth::Yellow);
    }

    #[test]
    fn test_health_red_when_low_fit_present() {
        let m = mapping(&[Issue::OverflowImages, Issue::LowFit]);
        assert_eq!(m.health(), SlideHealth::Red);
    }

    #[test]
    fn test_issue_serializes_snake_case() {
        let json = serde_json::to_string(&Issue::MissingTitlePlaceholder).unwrap();
        assert_eq!(json, "\"missing_title_placeholder\"");
        assert_eq!(Issue::LowFit.to_string(), "low_fit");
    }
}
