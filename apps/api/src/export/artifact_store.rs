//! Artifact storage for materialized exports.
//!
//! `LocalArtifactStore` writes under a directory on disk (local dev);
//! `S3ArtifactStore` targets MinIO or AWS.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact '{0}' not found")]
    NotFound(String),

    #[error("invalid artifact key '{0}'")]
    InvalidKey(String),

    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores `body` under `key` and returns the reference callers later fetch it by.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, ArtifactError>;

    async fn get(&self, reference: &str) -> Result<Bytes, ArtifactError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Local filesystem
// ────────────────────────────────────────────────────────────────────────────

pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, ArtifactError> {
        let relative = Path::new(key);
        let clean = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(ArtifactError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<String, ArtifactError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &body).await?;
        debug!("Wrote {} bytes to {}", body.len(), path.display());
        Ok(key.to_string())
    }

    async fn get(&self, reference: &str) -> Result<Bytes, ArtifactError> {
        let path = self.resolve(reference)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ArtifactError::NotFound(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 / MinIO
// ────────────────────────────────────────────────────────────────────────────

pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, ArtifactError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| ArtifactError::S3(format!("upload failed: {e}")))?;

        info!("Uploaded artifact to s3://{}/{}", self.bucket, key);
        Ok(key.to_string())
    }

    async fn get(&self, reference: &str) -> Result<Bytes, ArtifactError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(reference)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    ArtifactError::NotFound(reference.to_string())
                } else {
                    ArtifactError::S3(format!("download failed: {service_error}"))
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| ArtifactError::S3(format!("download stream failed: {e}")))?;
        Ok(data.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());

        let reference = store
            .put("jobs/abc/manifest.json", Bytes::from_static(b"{}"), "application/json")
            .await
            .unwrap();
        assert_eq!(reference, "jobs/abc/manifest.json");
        assert!(dir.path().join("jobs/abc/manifest.json").exists());

        let body = store.get(&reference).await.unwrap();
        assert_eq!(&body[..], b"{}");
    }

    #[tokio::test]
    async fn test_local_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());
        assert!(matches!(
            store.get("jobs/none/manifest.json").await,
            Err(ArtifactError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_local_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());
        for key in ["../secret", "/etc/passwd", ""] {
            assert!(matches!(
                store.get(key).await,
                Err(ArtifactError::InvalidKey(_))
            ));
        }
    }
}
