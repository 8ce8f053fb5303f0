//! Fit Scoring: pluggable, trait-based scorer that measures how well a template
//! layout can host a source page.
//!
//! Default: `CapacityFitScorer` (pure, deterministic, no hidden state).
//!
//! `AppState` holds an `Arc<dyn FitScorer>`; the plan builder and the plan
//! mutator both score through it so manual swaps and automatic picks agree.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Issue, Layout, PageSignature};

/// Below this score a page gets the synthetic `low_fit` issue.
pub const LOW_FIT_THRESHOLD: f64 = 0.55;

/// Bullets a single body placeholder hosts before text has to be split.
pub const BULLETS_PER_BODY: u32 = 2;

// Factor weights in points out of 100. Integral so a perfect match sums to exactly 1.0.
const TITLE_WEIGHT: f64 = 20.0;
const BODY_WEIGHT: f64 = 30.0;
const PICTURE_WEIGHT: f64 = 25.0;
const TABLE_WEIGHT: f64 = 15.0;
const COVERAGE_WEIGHT: f64 = 10.0;
const TOTAL_WEIGHT: f64 = TITLE_WEIGHT + BODY_WEIGHT + PICTURE_WEIGHT + TABLE_WEIGHT + COVERAGE_WEIGHT;

/// Credit for a title placeholder the page leaves empty.
const UNUSED_TITLE_CREDIT: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Per-factor credits, each in [0, 1] before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorCredits {
    pub title: f64,
    pub body: f64,
    pub picture: f64,
    pub table: f64,
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitScore {
    pub score: f64,
    pub issues: BTreeSet<Issue>,
    pub credits: FactorCredits,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Scoring is total: every (signature, layout) pair gets a score, never an error.
pub trait FitScorer: Send + Sync {
    fn score(&self, signature: &PageSignature, layout: &Layout) -> FitScore;
}

/// Weighted sum of independent capacity matches.
///
/// Algorithm:
/// 1. title, body, picture, table and coverage-balance credits are each computed in [0, 1]
/// 2. score = Σ(credit × weight) / Σ(weight), clamped to [0, 1]
/// 3. score < `LOW_FIT_THRESHOLD` adds `low_fit` on top of whatever fired
pub struct CapacityFitScorer;

impl FitScorer for CapacityFitScorer {
    fn score(&self, signature: &PageSignature, layout: &Layout) -> FitScore {
        compute_capacity_fit(signature, layout)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core capacity fit algorithm
// ────────────────────────────────────────────────────────────────────────────

pub fn compute_capacity_fit(signature: &PageSignature, layout: &Layout) -> FitScore {
    let mut issues = BTreeSet::new();

    let credits = FactorCredits {
        title: title_credit(signature, layout, &mut issues),
        body: body_credit(signature, layout, &mut issues),
        picture: picture_credit(signature, layout, &mut issues),
        table: table_credit(signature, layout, &mut issues),
        coverage: coverage_credit(signature, layout),
    };

    let weighted = credits.title * TITLE_WEIGHT
        + credits.body * BODY_WEIGHT
        + credits.picture * PICTURE_WEIGHT
        + credits.table * TABLE_WEIGHT
        + credits.coverage * COVERAGE_WEIGHT;
    let score = (weighted / TOTAL_WEIGHT).clamp(0.0, 1.0);

    if score < LOW_FIT_THRESHOLD {
        issues.insert(Issue::LowFit);
    }

    FitScore {
        score,
        issues,
        credits,
    }
}

fn title_credit(signature: &PageSignature, layout: &Layout, issues: &mut BTreeSet<Issue>) -> f64 {
    match (signature.has_title, layout.has_title) {
        (true, true) | (false, false) => 1.0,
        (true, false) => {
            // title text would be dropped
            issues.insert(Issue::MissingTitlePlaceholder);
            0.0
        }
        (false, true) => UNUSED_TITLE_CREDIT,
    }
}

/// Number of body placeholders the page's bullets need.
pub fn body_need(signature: &PageSignature) -> u32 {
    signature.bullet_count.div_ceil(BULLETS_PER_BODY)
}

fn body_credit(signature: &PageSignature, layout: &Layout, issues: &mut BTreeSet<Issue>) -> f64 {
    let need = body_need(signature);
    if need == 0 {
        return 1.0;
    }
    if layout.body_count == 0 {
        issues.insert(Issue::NoBodyPlaceholder);
        return 0.0;
    }

    let mut credit = capacity_ratio(layout.body_count, need);
    if need > layout.body_count {
        issues.insert(Issue::OverflowBullets);
    }
    if signature.column_count > layout.body_count {
        issues.insert(Issue::ColumnMismatch);
        credit = credit.min(capacity_ratio(layout.body_count, signature.column_count));
    }
    credit
}

fn picture_credit(signature: &PageSignature, layout: &Layout, issues: &mut BTreeSet<Issue>) -> f64 {
    let need = signature.image_count;
    if need == 0 {
        return 1.0;
    }
    if need > layout.picture_count {
        issues.insert(Issue::OverflowImages);
    }
    capacity_ratio(layout.picture_count, need)
}

fn table_credit(signature: &PageSignature, layout: &Layout, issues: &mut BTreeSet<Issue>) -> f64 {
    if signature.has_table && !layout.has_table {
        issues.insert(Issue::NoTablePlaceholder);
    }
    if signature.has_table == layout.has_table {
        1.0
    } else {
        0.0
    }
}

/// Tie-break factor: page image share vs the layout's picture-heavy/text-heavy bias.
fn coverage_credit(signature: &PageSignature, layout: &Layout) -> f64 {
    // neutral when either side has nothing to compare
    let page_total = signature.image_coverage_ratio + signature.text_coverage_ratio;
    if page_total <= 0.0 {
        return 1.0;
    }
    let page_share = signature.image_coverage_ratio / page_total;

    let slots = layout.body_count + layout.picture_count;
    if slots == 0 {
        return 1.0;
    }
    let layout_share = f64::from(layout.picture_count) / f64::from(slots);

    (1.0 - (page_share - layout_share).abs()).clamp(0.0, 1.0)
}

/// min(1, capacity / max(1, need))
fn capacity_ratio(capacity: u32, need: u32) -> f64 {
    (f64::from(capacity) / f64::from(need.max(1))).min(1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
