use std::sync::Arc;

use crate::config::Config;
use crate::export::{ArtifactStore, ExportEngine, ExportSettings, ManifestMaterializer};
use crate::ingest::catalog::{JsonCatalogBuilder, LayoutCatalogBuilder};
use crate::ingest::signature::{JsonSignatureExtractor, SignatureExtractor};
use crate::models::{Job, Plan, Source, Template};
use crate::planning::{CapacityFitScorer, PlanningService};
use crate::store::{MemoryRepository, Repository};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub templates: Arc<dyn Repository<Template>>,
    pub sources: Arc<dyn Repository<Source>>,
    /// Pluggable extraction collaborators. Default: JSON descriptor decoders.
    pub catalog_builder: Arc<dyn LayoutCatalogBuilder>,
    pub signature_extractor: Arc<dyn SignatureExtractor>,
    pub planning: PlanningService,
    pub exports: ExportEngine,
    pub artifacts: Arc<dyn ArtifactStore>,
}

impl AppState {
    /// Wires in-memory repositories, the default scorer and collaborators around `artifacts`.
    pub fn new(config: Config, artifacts: Arc<dyn ArtifactStore>) -> Self {
        let templates: Arc<dyn Repository<Template>> = Arc::new(MemoryRepository::new());
        let sources: Arc<dyn Repository<Source>> = Arc::new(MemoryRepository::new());
        let plans: Arc<dyn Repository<Plan>> = Arc::new(MemoryRepository::new());
        let jobs: Arc<dyn Repository<Job>> = Arc::new(MemoryRepository::new());

        let planning = PlanningService::new(
            Arc::new(CapacityFitScorer),
            templates.clone(),
            sources.clone(),
            plans.clone(),
        );
        let exports = ExportEngine::new(
            jobs,
            plans,
            templates.clone(),
            sources.clone(),
            Arc::new(ManifestMaterializer::new(artifacts.clone())),
            ExportSettings {
                workers: config.export_workers,
                timeout: config.export_timeout,
            },
        );

        Self {
            config,
            templates,
            sources,
            catalog_builder: Arc::new(JsonCatalogBuilder),
            signature_extractor: Arc::new(JsonSignatureExtractor),
            planning,
            exports,
            artifacts,
        }
    }
}
