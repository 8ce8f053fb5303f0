//! Layout Catalog Builder boundary.
//!
//! Parsing template containers happens in an external collaborator; this crate
//! consumes its output contract. `JsonCatalogBuilder` accepts that contract
//! serialized as JSON.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ingest::IngestError;
use crate::models::{Layout, ThemeMeta};

/// Collaborator output: theme plus layouts in catalog order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    #[serde(default)]
    pub theme_meta: ThemeMeta,
    pub layouts: Vec<Layout>,
}

#[async_trait]
pub trait LayoutCatalogBuilder: Send + Sync {
    async fn build(&self, bytes: &[u8]) -> Result<TemplateDescriptor, IngestError>;
}

pub struct JsonCatalogBuilder;

#[async_trait]
impl LayoutCatalogBuilder for JsonCatalogBuilder {
    async fn build(&self, bytes: &[u8]) -> Result<TemplateDescriptor, IngestError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
