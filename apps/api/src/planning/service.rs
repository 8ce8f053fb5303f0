//! Caller-facing planning operations: `buildPlan`, `swapLayout`, plan lookup.
//!
//! Templates and sources are read-only inputs; plans are persisted through the
//! repository and mutated only under their per-plan lock.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Issue, Plan, Source, Template};
use crate::planning::builder::build_plan;
use crate::planning::fit_scoring::FitScorer;
use crate::planning::mutator::swap_layout;
use crate::store::{PlanLocks, Repository};

#[derive(Clone)]
pub struct PlanningService {
    scorer: Arc<dyn FitScorer>,
    templates: Arc<dyn Repository<Template>>,
    sources: Arc<dyn Repository<Source>>,
    plans: Arc<dyn Repository<Plan>>,
    locks: Arc<PlanLocks>,
}

impl PlanningService {
    pub fn new(
        scorer: Arc<dyn FitScorer>,
        templates: Arc<dyn Repository<Template>>,
        sources: Arc<dyn Repository<Source>>,
        plans: Arc<dyn Repository<Plan>>,
    ) -> Self {
        Self {
            scorer,
            templates,
            sources,
            plans,
            locks: Arc::new(PlanLocks::default()),
        }
    }

    pub fn build(&self, template_id: Uuid, source_id: Uuid) -> Result<Plan, AppError> {
        let template = self.template(template_id)?;
        let source = self.source(source_id)?;

        let plan = build_plan(self.scorer.as_ref(), &template, &source)?;

        let low_fit = plan
            .slides
            .iter()
            .filter(|s| s.issues.contains(&Issue::LowFit))
            .count();
        if low_fit > 0 {
            warn!(
                "Plan {}: {low_fit}/{} slides have no adequate layout",
                plan.plan_id,
                plan.slides.len()
            );
        }

        self.plans.put(plan.plan_id, plan.clone());
        Ok(plan)
    }

    pub fn get(&self, plan_id: Uuid) -> Result<Plan, AppError> {
        self.plans
            .get(plan_id)
            .ok_or_else(|| AppError::NotFound(format!("Plan {plan_id} not found")))
    }

    pub fn swap(&self, plan_id: Uuid, slide_index: usize, layout_id: &str) -> Result<Plan, AppError> {
        let lock = self.locks.for_plan(plan_id);
        let _guard = lock.lock();

        let mut plan = self.get(plan_id)?;
        let template = self.template(plan.template_id)?;
        let source = self.source(plan.source_id)?;

        swap_layout(
            self.scorer.as_ref(),
            &mut plan,
            &template,
            &source,
            slide_index,
            layout_id,
        )?;

        self.plans.put(plan_id, plan.clone());
        info!("Plan {plan_id} updated");
        Ok(plan)
    }

    pub fn template(&self, template_id: Uuid) -> Result<Template, AppError> {
        self.templates
            .get(template_id)
            .ok_or_else(|| AppError::NotFound(format!("Template {template_id} not found")))
    }

    pub fn source(&self, source_id: Uuid) -> Result<Source, AppError> {
        self.sources
            .get(source_id)
            .ok_or_else(|| AppError::NotFound(format!("Source {source_id} not found")))
    }
}
