use crate::models::{JobReport, Layout, PageSignature, Plan, SlideHealth, Source, Template};
use crate::planning::fit_scoring::body_need;

/// Extra slides needed to carry bullets that don't fit the layout's bodies.
pub fn continuation_slides(signature: &PageSignature, layout: &Layout) -> u32 {
    let need = body_need(signature);
    if layout.body_count == 0 || need <= layout.body_count {
        return 0;
    }
    need.div_ceil(layout.body_count) - 1
}

/// Classifies every slide and tallies issues. Template and source are optional so
/// a best-effort report can still be produced when either has gone missing.
pub fn build_report(plan: &Plan, template: Option<&Template>, source: Option<&Source>) -> JobReport {
    let mut report = JobReport {
        slide_count: plan.slides.len() as u32,
        source_type: source.map(|s| s.source_type),
        reliability: source.map(|s| s.source_type.reliability()),
        page_warnings: source.map(Source::page_warning_count).unwrap_or(0),
        ..Default::default()
    };

    for slide in &plan.slides {
        match slide.health() {
            SlideHealth::Green => report.greens += 1,
            SlideHealth::Yellow => report.yellows += 1,
            SlideHealth::Red => report.reds += 1,
        }
        for issue in &slide.issues {
            *report.issues_by_type.entry(*issue).or_insert(0) += 1;
        }

        if let (Some(template), Some(source)) = (template, source) {
            let layout = template.layout(&slide.chosen_layout_id);
            let page = source.pages.get(slide.index);
            if let (Some(layout), Some(page)) = (layout, page) {
                report.continuation_slides += continuation_slides(&page.signature, layout);
            }
        }
    }

    report
}
