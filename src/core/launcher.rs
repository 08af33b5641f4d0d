use crate::domain::model::{BatchStatus, JobExecution, JobParameters};
use crate::domain::ports::Job;
use crate::utils::error::{BatchError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Launches jobs and tracks their run state per job name.
///
/// At most one execution per job name runs at a time; a second launch of a
/// running job is rejected right away. Parameters are minted in increasing
/// order, so only the newest completed `start_at` per job is kept: an
/// instance at or below it has already completed (or been superseded) and
/// cannot be launched again.
#[derive(Debug, Default)]
pub struct JobLauncher {
    running: Mutex<HashSet<String>>,
    last_completed: Mutex<HashMap<String, i64>>,
}

/// Holds the run flag for one job name until dropped.
struct RunPermit<'a> {
    launcher: &'a JobLauncher,
    job: String,
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        lock(&self.launcher.running).remove(&self.job);
    }
}

// Poisoning only means another launch panicked mid-update; the sets stay usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl JobLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, job: &str) -> bool {
        lock(&self.running).contains(job)
    }

    fn is_complete(&self, job: &str, parameters: JobParameters) -> bool {
        lock(&self.last_completed)
            .get(job)
            .is_some_and(|&newest| parameters.start_at <= newest)
    }

    fn acquire(&self, job: &str) -> Result<RunPermit<'_>> {
        if !lock(&self.running).insert(job.to_string()) {
            return Err(BatchError::AlreadyRunning {
                job: job.to_string(),
            });
        }
        Ok(RunPermit {
            launcher: self,
            job: job.to_string(),
        })
    }

    /// Runs `job` to completion on the calling task.
    ///
    /// A returned execution may still be `FAILED` (a chunk could not be
    /// written). `Err` means the job never produced an outcome.
    pub async fn run(&self, job: &dyn Job, parameters: JobParameters) -> Result<JobExecution> {
        let name = job.name().to_string();

        let _permit = self.acquire(&name).inspect_err(|_| {
            tracing::warn!("⏳ Job '{}' is already running, launch rejected", name);
        })?;

        if self.is_complete(&name, parameters) {
            return Err(BatchError::InstanceAlreadyComplete {
                job: name,
                start_at: parameters.start_at,
            });
        }

        let mut execution = JobExecution::new(name.as_str(), parameters);
        execution.start();
        tracing::info!("🚀 Job '{}' launched (start_at={})", name, parameters.start_at);

        match job.execute(&parameters).await {
            Ok(outcome) => {
                execution.finish(outcome);
            }
            Err(e) => {
                execution.fail();
                tracing::error!(
                    "❌ Job '{}' aborted: {} (Category: {:?})",
                    name,
                    e,
                    e.category()
                );
                return Err(e);
            }
        }

        if execution.status == BatchStatus::Completed {
            let mut last_completed = lock(&self.last_completed);
            let newest = last_completed.entry(name.clone()).or_insert(parameters.start_at);
            *newest = (*newest).max(parameters.start_at);
        }

        tracing::info!(
            "🏁 Job '{}' finished with status {:?}",
            name,
            execution.status
        );
        Ok(execution)
    }
}
