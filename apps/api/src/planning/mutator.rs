//! Plan Mutator: manual single-slide re-assignment.
//!
//! The caller's layout choice is authoritative: no arg-max search, just a
//! re-score of the one targeted page against the requested layout.

use tracing::info;

use crate::models::{Plan, SlideMapping, Source, Template};
use crate::planning::error::PlanError;
use crate::planning::fit_scoring::FitScorer;

/// Replaces exactly `plan.slides[slide_index]`; every other mapping is left untouched.
/// Idempotent for identical arguments.
pub fn swap_layout(
    scorer: &dyn FitScorer,
    plan: &mut Plan,
    template: &Template,
    source: &Source,
    slide_index: usize,
    layout_id: &str,
) -> Result<(), PlanError> {
    let len = plan.slides.len();
    let page = match (plan.slides.get(slide_index), source.pages.get(slide_index)) {
        (Some(_), Some(page)) => page,
        _ => {
            return Err(PlanError::IndexOutOfRange {
                index: slide_index,
                len,
            })
        }
    };
    let layout = template
        .layout(layout_id)
        .ok_or_else(|| PlanError::UnknownLayout(layout_id.to_string()))?;

    let fit = scorer.score(&page.signature, layout);
    info!(
        "Plan {}: slide {slide_index} swapped to {layout_id} (score {:.3})",
        plan.plan_id, fit.score
    );

    plan.slides[slide_index] = SlideMapping {
        index: slide_index,
        chosen_layout_id: layout.layout_id.clone(),
        score: fit.score,
        issues: fit.issues,
        manual: true,
    };
    Ok(())
}
