use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_FONT: &str = "Calibri";
const DEFAULT_ACCENTS: [&str; 6] = [
    "#4472C4", "#ED7D31", "#A5A5A5", "#FFC000", "#5B9BD5", "#70AD47",
];

/// A named slot structure with fixed placeholder capacities.
/// Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub layout_id: String,
    pub name: String,
    pub has_title: bool,
    pub body_count: u32,
    pub picture_count: u32,
    pub has_table: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeFonts {
    pub title: String,
    pub body: String,
}

impl Default for ThemeFonts {
    fn default() -> Self {
        Self {
            title: DEFAULT_FONT.to_string(),
            body: DEFAULT_FONT.to_string(),
        }
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl Default for PageSize {
    fn default() -> Self {
        // 16:9 widescreen
        Self {
            width: 960.0,
            height: 540.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThemeMeta {
    #[serde(default)]
    pub fonts: ThemeFonts,
    /// Color mapping, e.g. `accent1` → `#4472C4`.
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub page_size: PageSize,
}

impl ThemeMeta {
    /// Fills `accent1`..`accent6` with the Office defaults where the template left them out.
    pub fn with_default_accents(mut self) -> Self {
        for (i, color) in DEFAULT_ACCENTS.iter().enumerate() {
            self.colors
                .entry(format!("accent{}", i + 1))
                .or_insert_with(|| color.to_string());
        }
        self
    }
}

/// A brand template: theme metadata plus its layout catalog.
/// Catalog order is insertion order and is the tie-break order for planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub template_id: Uuid,
    pub theme_meta: ThemeMeta,
    pub layouts: Vec<Layout>,
    pub created_at: DateTime<Utc>,
}

impl Template {
    pub fn layout(&self, layout_id: &str) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.layout_id == layout_id)
    }

    pub fn contains_layout(&self, layout_id: &str) -> bool {
        self.layout(layout_id).is_some()
    }
}
