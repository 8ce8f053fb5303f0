// Export: job engine, materialization collaborator, artifact storage, reports.
// Jobs run on spawned tasks; callers only ever poll.

pub mod artifact_store;
pub mod engine;
pub mod handlers;
pub mod materializer;
pub mod report;

pub use artifact_store::{ArtifactError, ArtifactStore, LocalArtifactStore, S3ArtifactStore};
pub use engine::{ExportEngine, ExportSettings};
pub use materializer::ManifestMaterializer;
