//! Signature Extractor boundary. Same shape as the catalog builder: the
//! collaborator emits per-page signatures, `JsonSignatureExtractor` decodes them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ingest::IngestError;
use crate::models::{SourcePage, SourceType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub pages: Vec<SourcePage>,
}

#[async_trait]
pub trait SignatureExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8]) -> Result<SourceDescriptor, IngestError>;
}

pub struct JsonSignatureExtractor;

#[async_trait]
impl SignatureExtractor for JsonSignatureExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<SourceDescriptor, IngestError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
