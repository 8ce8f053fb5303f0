//! Materialization collaborator: turns a finalized plan into an output artifact.
//!
//! The shipped `ManifestMaterializer` emits a render manifest (JSON) that a
//! downstream renderer consumes; it never rasterizes or writes container formats.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::export::artifact_store::{ArtifactError, ArtifactStore};
use crate::export::report::continuation_slides;
use crate::models::{Issue, Plan, SlideHealth, Source, SourceType, Template, ThemeMeta};
use crate::planning::fit_scoring::body_need;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("slide {index}: layout '{layout_id}' not in template")]
    MissingLayout { index: usize, layout_id: String },

    #[error("slide {0} has no source page")]
    MissingPage(usize),

    #[error("could not encode manifest: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Read-only view handed to the collaborator.
pub struct MaterializeRequest<'a> {
    pub job_id: Uuid,
    pub plan: &'a Plan,
    pub template: &'a Template,
    pub source: &'a Source,
}

#[async_trait]
pub trait Materializer: Send + Sync {
    /// Returns the artifact reference on success.
    async fn materialize(&self, request: MaterializeRequest<'_>) -> Result<String, MaterializeError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderManifest {
    pub plan_id: Uuid,
    pub template_id: Uuid,
    pub source_id: Uuid,
    pub source_type: SourceType,
    pub theme: ThemeMeta,
    pub slides: Vec<ManifestSlide>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSlide {
    pub source_index: usize,
    pub layout_id: String,
    pub layout_name: String,
    pub fill_title: bool,
    pub bodies_used: u32,
    pub pictures_used: u32,
    pub fill_table: bool,
    pub continuation_slides: u32,
    pub health: SlideHealth,
    pub issues: BTreeSet<Issue>,
}

pub fn render_manifest(plan: &Plan, template: &Template, source: &Source) -> Result<RenderManifest, MaterializeError> {
    let slides = plan
        .slides
        .iter()
        .map(|slide| {
            let layout = template.layout(&slide.chosen_layout_id).ok_or_else(|| {
                MaterializeError::MissingLayout {
                    index: slide.index,
                    layout_id: slide.chosen_layout_id.clone(),
                }
            })?;
            let sig = &source
                .pages
                .get(slide.index)
                .ok_or(MaterializeError::MissingPage(slide.index))?
                .signature;

            Ok(ManifestSlide {
                source_index: slide.index,
                layout_id: layout.layout_id.clone(),
                layout_name: layout.name.clone(),
                fill_title: sig.has_title && layout.has_title,
                bodies_used: body_need(sig).min(layout.body_count),
                pictures_used: sig.image_count.min(layout.picture_count),
                fill_table: sig.has_table && layout.has_table,
                continuation_slides: continuation_slides(sig, layout),
                health: slide.health(),
                issues: slide.issues.clone(),
            })
        })
        .collect::<Result<Vec<_>, MaterializeError>>()?;

    Ok(RenderManifest {
        plan_id: plan.plan_id,
        template_id: template.template_id,
        source_id: source.source_id,
        source_type: source.source_type,
        theme: template.theme_meta.clone(),
        slides,
    })
}

pub struct ManifestMaterializer {
    store: Arc<dyn ArtifactStore>,
}

impl ManifestMaterializer {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Materializer for ManifestMaterializer {
    async fn materialize(&self, request: MaterializeRequest<'_>) -> Result<String, MaterializeError> {
        let manifest = render_manifest(request.plan, request.template, request.source)?;
        let body = serde_json::to_vec_pretty(&manifest)?;
        let key = format!("jobs/{}/manifest.json", request.job_id);
        Ok(self
            .store
            .put(&key, Bytes::from(body), "application/json")
            .await?)
    }
}
