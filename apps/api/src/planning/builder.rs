//! Plan Builder: scores every page against every layout and keeps the arg-max.
//!
//! Pages are independent: no cross-page state, so any single page can be
//! re-scored in isolation (which is what the mutator relies on).

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Layout, PageSignature, Plan, SlideMapping, Source, Template};
use crate::planning::error::PlanError;
use crate::planning::fit_scoring::{FitScore, FitScorer};

/// Builds a fresh plan. No partial plan is produced on error.
pub fn build_plan(
    scorer: &dyn FitScorer,
    template: &Template,
    source: &Source,
) -> Result<Plan, PlanError> {
    if template.layouts.is_empty() {
        return Err(PlanError::EmptyCatalog);
    }
    if source.pages.is_empty() {
        return Err(PlanError::EmptySource);
    }

    let slides = source
        .pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let (layout, fit) = best_layout(scorer, &page.signature, &template.layouts)
                .ok_or(PlanError::EmptyCatalog)?;
            debug!(
                "page {index} -> {} (score {:.3}, {} issues)",
                layout.layout_id,
                fit.score,
                fit.issues.len()
            );
            Ok(SlideMapping {
                index,
                chosen_layout_id: layout.layout_id.clone(),
                score: fit.score,
                issues: fit.issues,
                manual: false,
            })
        })
        .collect::<Result<Vec<_>, PlanError>>()?;

    let plan = Plan {
        plan_id: Uuid::new_v4(),
        template_id: template.template_id,
        source_id: source.source_id,
        slides,
        created_at: Utc::now(),
    };

    info!(
        "Built plan {} ({} slides) for template {} / source {}",
        plan.plan_id,
        plan.slides.len(),
        plan.template_id,
        plan.source_id
    );
    Ok(plan)
}

/// Strictly-highest score wins; exact ties keep the earliest layout in catalog order.
fn best_layout<'a>(
    scorer: &dyn FitScorer,
    signature: &PageSignature,
    layouts: &'a [Layout],
) -> Option<(&'a Layout, FitScore)> {
    let mut candidates = layouts.iter().map(|l| (l, scorer.score(signature, l)));
    let first = candidates.next()?;

    Some(candidates.fold(first, |best, candidate| {
        if candidate.1.score > best.1.score {
            candidate
        } else {
            best
        }
    }))
}
