//! Export Job Engine: asynchronous `queued → running → {done | error}` state machine.
//!
//! Flow: create_job (snapshot plan, store queued job, spawn) → wait for a worker
//! permit → running → integrity re-checks → materialize under timeout → done/error.
//!
//! Callers observe progress by polling `status`. Jobs are not cancellable and
//! never retried; re-submitting creates a new job.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::materializer::{MaterializeError, MaterializeRequest, Materializer};
use crate::export::report::build_report;
use crate::models::{Job, JobStatus, Plan, Source, Template};
use crate::store::Repository;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template {0} is no longer available")]
    MissingTemplate(Uuid),

    #[error("source {0} is no longer available")]
    MissingSource(Uuid),

    #[error("plan has {slides} slides but source has {pages} pages")]
    SlideCountMismatch { slides: usize, pages: usize },

    #[error("slide {index} references layout '{layout_id}' absent from the catalog")]
    UnknownLayout { index: usize, layout_id: String },

    #[error("materialization failed: {0}")]
    Materialize(#[from] MaterializeError),

    #[error("export timed out after {0:?}")]
    TimedOut(Duration),

    #[error("materializer crashed: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ExportSettings {
    pub workers: usize,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct ExportEngine {
    jobs: Arc<dyn Repository<Job>>,
    plans: Arc<dyn Repository<Plan>>,
    templates: Arc<dyn Repository<Template>>,
    sources: Arc<dyn Repository<Source>>,
    materializer: Arc<dyn Materializer>,
    workers: Arc<Semaphore>,
    timeout: Duration,
}

impl ExportEngine {
    pub fn new(
        jobs: Arc<dyn Repository<Job>>,
        plans: Arc<dyn Repository<Plan>>,
        templates: Arc<dyn Repository<Template>>,
        sources: Arc<dyn Repository<Source>>,
        materializer: Arc<dyn Materializer>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            jobs,
            plans,
            templates,
            sources,
            materializer,
            workers: Arc::new(Semaphore::new(settings.workers.max(1))),
            timeout: settings.timeout,
        }
    }

    /// `createExportJob`: returns immediately; the job runs on its own task.
    pub fn create_job(&self, plan_id: Uuid) -> Result<Uuid, AppError> {
        let plan = self
            .plans
            .get(plan_id)
            .ok_or_else(|| AppError::NotFound(format!("Plan {plan_id} not found")))?;

        let job = Job::new(plan_id);
        let job_id = job.job_id;
        self.jobs.put(job_id, job);
        info!("Queued export job {job_id} for plan {plan_id}");

        let engine = self.clone();
        tokio::spawn(async move { engine.run(job_id, plan).await });

        Ok(job_id)
    }

    /// `getJobStatus`
    pub fn status(&self, job_id: Uuid) -> Result<Job, AppError> {
        self.jobs
            .get(job_id)
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
    }

    /// `getArtifactReference`: `NotReady` until the job is done.
    pub fn artifact_reference(&self, job_id: Uuid) -> Result<String, AppError> {
        let job = self.status(job_id)?;
        if !job.status.is_terminal() {
            return Err(AppError::NotReady(format!(
                "Job {job_id} is still {:?}",
                job.status
            )));
        }
        match job.status {
            JobStatus::Done => job.artifact_reference.ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("job {job_id} is done without an artifact"))
            }),
            _ => Err(AppError::UnprocessableEntity(format!(
                "Job {job_id} failed: {}",
                job.error_message.unwrap_or_default()
            ))),
        }
    }

    async fn run(self, job_id: Uuid, plan: Plan) {
        // The job stays queued until a worker slot frees up.
        let _permit = self.workers.clone().acquire_owned().await;

        let Some(mut job) = self.jobs.get(job_id) else {
            error!("Export job {job_id} vanished before it started");
            return;
        };
        if let Err(e) = job.start() {
            error!("Export job {job_id}: {e}");
            return;
        }
        self.jobs.put(job_id, job.clone());
        info!("Export job {job_id} running ({} slides)", plan.slides.len());

        let template = self.templates.get(plan.template_id);
        let source = self.sources.get(plan.source_id);
        let report = build_report(&plan, template.as_ref(), source.as_ref());

        let outcome = match (template, source) {
            (Some(template), Some(source)) => self.execute(job_id, plan, template, source).await,
            (None, _) => Err(ExportError::MissingTemplate(plan.template_id)),
            (_, None) => Err(ExportError::MissingSource(plan.source_id)),
        };

        let transition = match outcome {
            Ok(reference) => {
                info!(
                    "Export job {job_id} done: {} green / {} yellow / {} red -> {reference}",
                    report.greens, report.yellows, report.reds
                );
                job.complete(report, reference)
            }
            Err(e) => {
                error!("Export job {job_id} failed: {e}");
                job.fail(e.to_string(), Some(report))
            }
        };
        if let Err(e) = transition {
            error!("Export job {job_id}: {e}");
            return;
        }
        self.jobs.put(job_id, job);
    }

    async fn execute(
        &self,
        job_id: Uuid,
        plan: Plan,
        template: Template,
        source: Source,
    ) -> Result<String, ExportError> {
        check_plan_integrity(&plan, &template, &source)?;

        // A panic inside the collaborator ends this inner task only; the job still settles.
        let materializer = self.materializer.clone();
        let mut handle = tokio::spawn(async move {
            let request = MaterializeRequest {
                job_id,
                plan: &plan,
                template: &template,
                source: &source,
            };
            materializer.materialize(request).await
        });
        match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join_error)) => Err(ExportError::Panicked(join_error.to_string())),
            Err(_) => {
                handle.abort();
                warn!("Export job {job_id} exceeded {:?}", self.timeout);
                Err(ExportError::TimedOut(self.timeout))
            }
        }
    }
}

/// Re-check at execution time: the plan may predate changes to its inputs.
fn check_plan_integrity(plan: &Plan, template: &Template, source: &Source) -> Result<(), ExportError> {
    if plan.slides.len() != source.pages.len() {
        return Err(ExportError::SlideCountMismatch {
            slides: plan.slides.len(),
            pages: source.pages.len(),
        });
    }
    match plan
        .slides
        .iter()
        .find(|s| !template.contains_layout(&s.chosen_layout_id))
    {
        Some(slide) => Err(ExportError::UnknownLayout {
            index: slide.index,
            layout_id: slide.chosen_layout_id.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::materializer::ManifestMaterializer;
    use crate::export::artifact_store::LocalArtifactStore;
    use crate::models::{Issue, Layout, PageSignature, SourcePage, SourceType, ThemeMeta};
    use crate::planning::builder::build_plan;
    use crate::planning::fit_scoring::CapacityFitScorer;
    use crate::store::MemoryRepository;
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;

    struct Fixture {
        engine: ExportEngine,
        plans: Arc<MemoryRepository<Plan>>,
        templates: Arc<MemoryRepository<Template>>,
        plan: Plan,
    }

    fn fixture(materializer: Arc<dyn Materializer>, settings: ExportSettings) -> Fixture {
        let template = Template {
            template_id: Uuid::new_v4(),
            theme_meta: ThemeMeta::default(),
            layouts: vec![Layout {
                layout_id: "two_content".to_string(),
                name: "Two Content".to_string(),
                has_title: true,
                body_count: 2,
                picture_count: 0,
                has_table: false,
            }],
            created_at: Utc::now(),
        };
        let source = Source {
            source_id: Uuid::new_v4(),
            source_type: SourceType::Pptx,
            pages: (0..4)
                .map(|index| SourcePage {
                    index,
                    signature: PageSignature {
                        has_title: true,
                        bullet_count: 2,
                        ..Default::default()
                    },
                    warnings: Default::default(),
                })
                .collect(),
            created_at: Utc::now(),
        };
        let plan = build_plan(&CapacityFitScorer, &template, &source).unwrap();

        let plans = Arc::new(MemoryRepository::new());
        let templates = Arc::new(MemoryRepository::new());
        let sources = Arc::new(MemoryRepository::new());
        plans.put(plan.plan_id, plan.clone());
        templates.put(template.template_id, template);
        sources.put(source.source_id, source);

        let engine = ExportEngine::new(
            Arc::new(MemoryRepository::new()),
            plans.clone(),
            templates.clone(),
            sources,
            materializer,
            settings,
        );
        Fixture {
            engine,
            plans,
            templates,
            plan,
        }
    }

    fn settings() -> ExportSettings {
        ExportSettings {
            workers: 2,
            timeout: Duration::from_secs(5),
        }
    }

    /// Polls until terminal, returning every distinct status observed in order.
    async fn poll_until_terminal(engine: &ExportEngine, job_id: Uuid) -> (Job, Vec<JobStatus>) {
        let mut seen: Vec<JobStatus> = Vec::new();
        for _ in 0..10_000 {
            let job = engine.status(job_id).unwrap();
            if seen.last() != Some(&job.status) {
                seen.push(job.status);
            }
            if job.status.is_terminal() {
                return (job, seen);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {job_id} never finished");
    }

    fn assert_ordered_prefix(seen: &[JobStatus]) {
        let done = [JobStatus::Queued, JobStatus::Running, JobStatus::Done];
        let failed = [JobStatus::Queued, JobStatus::Running, JobStatus::Error];
        let is_prefix = |full: &[JobStatus]| {
            // polling may miss states, but never sees them out of order
            let mut cursor = full.iter();
            seen.iter().all(|s| cursor.any(|f| f == s))
        };
        assert!(is_prefix(&done) || is_prefix(&failed), "out of order: {seen:?}");
    }

    struct FailingMaterializer;

    #[async_trait]
    impl Materializer for FailingMaterializer {
        async fn materialize(&self, _request: MaterializeRequest<'_>) -> Result<String, MaterializeError> {
            Err(MaterializeError::MissingPage(0))
        }
    }

    struct StuckMaterializer;

    #[async_trait]
    impl Materializer for StuckMaterializer {
        async fn materialize(&self, _request: MaterializeRequest<'_>) -> Result<String, MaterializeError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".to_string())
        }
    }

    struct PanickingMaterializer;

    #[async_trait]
    impl Materializer for PanickingMaterializer {
        async fn materialize(&self, _request: MaterializeRequest<'_>) -> Result<String, MaterializeError> {
            panic!("collaborator bug");
        }
    }

    /// Blocks until released so tests can observe the running state.
    struct GatedMaterializer {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Materializer for GatedMaterializer {
        async fn materialize(&self, request: MaterializeRequest<'_>) -> Result<String, MaterializeError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(format!("jobs/{}/manifest.json", request.job_id))
        }
    }

    #[tokio::test]
    async fn test_all_green_plan_exports_done() {
        let dir = tempfile::tempdir().unwrap();
        let materializer = Arc::new(ManifestMaterializer::new(Arc::new(LocalArtifactStore::new(
            dir.path(),
        ))));
        let f = fixture(materializer, settings());

        let job_id = f.engine.create_job(f.plan.plan_id).unwrap();
        assert_eq!(f.engine.status(job_id).unwrap().status, JobStatus::Queued);

        let (job, seen) = poll_until_terminal(&f.engine, job_id).await;
        assert_ordered_prefix(&seen);
        assert_eq!(job.status, JobStatus::Done);

        let report = job.report.unwrap();
        assert_eq!(report.greens, 4);
        assert_eq!(report.yellows, 0);
        assert_eq!(report.reds, 0);
        assert!(report.issues_by_type.is_empty());

        let reference = f.engine.artifact_reference(job_id).unwrap();
        assert!(dir.path().join(&reference).exists());
        let statuses: Vec<JobStatus> = job.transitions.iter().map(|t| t.status).collect();
        assert_eq!(statuses, vec![JobStatus::Queued, JobStatus::Running, JobStatus::Done]);
    }

    #[tokio::test]
    async fn test_running_is_observable_and_artifact_not_ready() {
        let gate = Arc::new(GatedMaterializer {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let f = fixture(gate.clone(), settings());

        let job_id = f.engine.create_job(f.plan.plan_id).unwrap();
        assert!(matches!(
            f.engine.artifact_reference(job_id),
            Err(AppError::NotReady(_))
        ));

        gate.entered.notified().await;
        assert_eq!(f.engine.status(job_id).unwrap().status, JobStatus::Running);
        assert!(matches!(
            f.engine.artifact_reference(job_id),
            Err(AppError::NotReady(_))
        ));

        gate.release.notify_one();
        let (job, seen) = poll_until_terminal(&f.engine, job_id).await;
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(seen.last(), Some(&JobStatus::Done));
    }

    #[tokio::test]
    async fn test_collaborator_failure_sets_error_with_report() {
        let f = fixture(Arc::new(FailingMaterializer), settings());
        let job_id = f.engine.create_job(f.plan.plan_id).unwrap();

        let (job, seen) = poll_until_terminal(&f.engine, job_id).await;
        assert_ordered_prefix(&seen);
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.artifact_reference.is_none());
        assert!(job.error_message.unwrap().contains("materialization failed"));
        assert_eq!(job.report.unwrap().greens, 4);
        assert!(matches!(
            f.engine.artifact_reference(job_id),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_export_times_out_to_error() {
        let f = fixture(
            Arc::new(StuckMaterializer),
            ExportSettings {
                workers: 1,
                timeout: Duration::from_secs(2),
            },
        );
        let job_id = f.engine.create_job(f.plan.plan_id).unwrap();

        let (job, _) = poll_until_terminal(&f.engine, job_id).await;
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.error_message.unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_materializer_panic_fails_job_instead_of_hanging() {
        let f = fixture(
            Arc::new(PanickingMaterializer),
            ExportSettings {
                workers: 1,
                timeout: Duration::from_secs(2),
            },
        );
        let job_id = f.engine.create_job(f.plan.plan_id).unwrap();

        tokio::time::sleep(Duration::from_secs(600)).await;
        let job = f.engine.status(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.error_message.unwrap().contains("materializer crashed"));
        assert_eq!(job.report.unwrap().slide_count, 4);

        // the worker permit was returned: a second job still runs
        let next = f.engine.create_job(f.plan.plan_id).unwrap();
        let (job, _) = poll_until_terminal(&f.engine, next).await;
        assert_eq!(job.status, JobStatus::Error);
    }

    #[tokio::test]
    async fn test_dangling_layout_fails_integrity_check() {
        let f = fixture(Arc::new(FailingMaterializer), settings());
        let mut corrupted = f.plan.clone();
        corrupted.slides[1].chosen_layout_id = "deleted".to_string();
        corrupted.slides[1].issues.insert(Issue::LowFit);
        f.plans.put(corrupted.plan_id, corrupted);

        let job_id = f.engine.create_job(f.plan.plan_id).unwrap();
        let (job, _) = poll_until_terminal(&f.engine, job_id).await;

        assert_eq!(job.status, JobStatus::Error);
        assert!(job.error_message.unwrap().contains("'deleted'"));
        assert_eq!(job.report.unwrap().reds, 1);
    }

    #[tokio::test]
    async fn test_missing_template_fails_job() {
        let f = fixture(Arc::new(FailingMaterializer), settings());
        // a repository that lost the template between planning and export
        let engine = ExportEngine::new(
            Arc::new(MemoryRepository::new()),
            f.plans.clone(),
            Arc::new(MemoryRepository::<Template>::new()),
            Arc::new(MemoryRepository::<Source>::new()),
            Arc::new(FailingMaterializer),
            settings(),
        );
        assert!(f.templates.get(f.plan.template_id).is_some());

        let job_id = engine.create_job(f.plan.plan_id).unwrap();
        let (job, _) = poll_until_terminal(&engine, job_id).await;
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.error_message.unwrap().contains("no longer available"));
        assert_eq!(job.report.unwrap().slide_count, 4);
    }

    #[tokio::test]
    async fn test_each_export_creates_a_new_job() {
        let f = fixture(Arc::new(FailingMaterializer), settings());
        let a = f.engine.create_job(f.plan.plan_id).unwrap();
        let b = f.engine.create_job(f.plan.plan_id).unwrap();
        assert_ne!(a, b);
        poll_until_terminal(&f.engine, a).await;
        poll_until_terminal(&f.engine, b).await;
    }

    #[tokio::test]
    async fn test_job_waits_queued_for_a_worker() {
        let gate = Arc::new(GatedMaterializer {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let f = fixture(
            gate.clone(),
            ExportSettings {
                workers: 1,
                timeout: Duration::from_secs(5),
            },
        );

        let first = f.engine.create_job(f.plan.plan_id).unwrap();
        gate.entered.notified().await;
        let second = f.engine.create_job(f.plan.plan_id).unwrap();
        tokio::task::yield_now().await;
        assert_eq!(f.engine.status(second).unwrap().status, JobStatus::Queued);

        gate.release.notify_one();
        poll_until_terminal(&f.engine, first).await;
        gate.entered.notified().await;
        gate.release.notify_one();
        let (job, _) = poll_until_terminal(&f.engine, second).await;
        assert_eq!(job.status, JobStatus::Done);
    }

    #[tokio::test]
    async fn test_unknown_plan_is_not_found() {
        let f = fixture(Arc::new(FailingMaterializer), settings());
        assert!(matches!(
            f.engine.create_job(Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
    }
}
