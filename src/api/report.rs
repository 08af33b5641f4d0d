//! Maps launcher results onto HTTP responses.
//!
//! Counts are only logged here; bodies carry fixed messages so no internal
//! error detail reaches the caller.

use crate::domain::model::{BatchStatus, JobExecution};
use crate::utils::error::{BatchError, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const EMPLOYEE_COMPLETED: &str = "Employee CSV processed";
pub const JOB_NOT_COMPLETED: &str = "Job did not complete";
pub const JOB_ALREADY_RUNNING: &str = "Job is already running";
pub const JOB_ERROR: &str = "Job execution error";

/// What the caller gets back for one trigger.
#[derive(Debug)]
pub enum JobReport<T> {
    /// COMPLETED, with an optional body (e.g. the first stored record).
    Completed(Option<T>),
    NotCompleted,
    AlreadyRunning,
    Error,
}

fn log_execution(execution: &JobExecution) {
    if let Some(outcome) = &execution.outcome {
        tracing::info!(
            "📊 {} {:?}: read={}, written={}, skipped={}, filtered={}",
            execution.job_name,
            outcome.status,
            outcome.read_count,
            outcome.write_count,
            outcome.skip_count,
            outcome.filter_count
        );
    }
}

fn log_error(job: &str, error: &BatchError) -> JobReport<()> {
    match error {
        BatchError::AlreadyRunning { .. } => JobReport::AlreadyRunning,
        other => {
            tracing::error!(
                "❌ Job '{}' failed: {} (Category: {:?})",
                job,
                other,
                other.category()
            );
            JobReport::Error
        }
    }
}

impl<T> JobReport<T> {
    /// Classifies a launcher result. `body` is only consulted for completed runs.
    pub async fn from_result<F, Fut>(job: &str, result: Result<JobExecution>, body: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Option<T>>>,
    {
        let execution = match result {
            Ok(execution) => execution,
            Err(e) => return log_error(job, &e).cast(),
        };

        log_execution(&execution);

        if execution.status != BatchStatus::Completed {
            return JobReport::NotCompleted;
        }

        match body().await {
            Ok(body) => JobReport::Completed(body),
            Err(e) => log_error(job, &e).cast(),
        }
    }
}

impl JobReport<()> {
    fn cast<T>(self) -> JobReport<T> {
        match self {
            JobReport::Completed(_) => JobReport::Completed(None),
            JobReport::NotCompleted => JobReport::NotCompleted,
            JobReport::AlreadyRunning => JobReport::AlreadyRunning,
            JobReport::Error => JobReport::Error,
        }
    }
}

/// Plain-text flavour used by `POST /employee/set`.
pub struct TextReport(pub JobReport<()>);

impl IntoResponse for TextReport {
    fn into_response(self) -> Response {
        match self.0 {
            JobReport::Completed(_) => (StatusCode::OK, EMPLOYEE_COMPLETED).into_response(),
            JobReport::NotCompleted => {
                (StatusCode::BAD_REQUEST, JOB_NOT_COMPLETED).into_response()
            }
            JobReport::AlreadyRunning => {
                (StatusCode::CONFLICT, JOB_ALREADY_RUNNING).into_response()
            }
            JobReport::Error => (StatusCode::INTERNAL_SERVER_ERROR, JOB_ERROR).into_response(),
        }
    }
}

/// JSON flavour used by the person endpoints: 200 with the record, 204 when
/// the store is empty, bare status codes otherwise.
pub struct RecordReport<T>(pub JobReport<T>);

impl<T: Serialize> IntoResponse for RecordReport<T> {
    fn into_response(self) -> Response {
        match self.0 {
            JobReport::Completed(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
            JobReport::Completed(None) => StatusCode::NO_CONTENT.into_response(),
            JobReport::NotCompleted => StatusCode::BAD_REQUEST.into_response(),
            JobReport::AlreadyRunning => {
                (StatusCode::CONFLICT, JOB_ALREADY_RUNNING).into_response()
            }
            JobReport::Error => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
