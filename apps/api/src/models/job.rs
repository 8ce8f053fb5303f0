use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::plan::Issue;
use crate::models::source::{Reliability, SourceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    /// The only legal edges: queued → running → {done | error}.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Done)
                | (JobStatus::Running, JobStatus::Error)
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum JobError {
    #[error("illegal job transition {from:?} -> {to:?}")]
    IllegalTransition { from: JobStatus, to: JobStatus },
}

/// Aggregate pass/fail summary of an export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobReport {
    pub slide_count: u32,
    pub greens: u32,
    pub yellows: u32,
    pub reds: u32,
    pub issues_by_type: BTreeMap<Issue, u32>,
    pub source_type: Option<SourceType>,
    pub reliability: Option<Reliability>,
    /// Extraction warnings summed over all source pages.
    pub page_warnings: u32,
    /// Extra output slides needed to carry overflowing bullets.
    pub continuation_slides: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub status: JobStatus,
    pub at: DateTime<Utc>,
}

/// One export request. Never reused: every export creates a new Job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub plan_id: Uuid,
    pub status: JobStatus,
    pub report: Option<JobReport>,
    pub artifact_reference: Option<String>,
    pub error_message: Option<String>,
    pub transitions: Vec<StatusTransition>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(plan_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            job_id: Uuid::new_v4(),
            plan_id,
            status: JobStatus::Queued,
            report: None,
            artifact_reference: None,
            error_message: None,
            transitions: vec![StatusTransition {
                status: JobStatus::Queued,
                at: now,
            }],
            created_at: now,
        }
    }

    pub fn start(&mut self) -> Result<(), JobError> {
        self.advance(JobStatus::Running)
    }

    pub fn complete(&mut self, report: JobReport, artifact_reference: String) -> Result<(), JobError> {
        self.advance(JobStatus::Done)?;
        self.report = Some(report);
        self.artifact_reference = Some(artifact_reference);
        Ok(())
    }

    /// `report` is best-effort diagnostics; the artifact stays unset.
    pub fn fail(&mut self, message: String, report: Option<JobReport>) -> Result<(), JobError> {
        self.advance(JobStatus::Error)?;
        self.report = report;
        self.error_message = Some(message);
        Ok(())
    }

    fn advance(&mut self, next: JobStatus) -> Result<(), JobError> {
        if !self.status.can_transition_to(next) {
            return Err(JobError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.transitions.push(StatusTransition {
            status: next,
            at: Utc::now(),
        });
        Ok(())
    }
}
