use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// One tokenized input row, with its 1-based line number in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub line_number: u64,
    pub fields: Vec<String>,
}

impl RawLine {
    pub fn new(line_number: u64, fields: Vec<String>) -> Self {
        Self {
            line_number,
            fields,
        }
    }

    /// Field at `index`, or `None` when the line was cut short.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// An empty line in the source: a single empty field.
    pub fn is_blank(&self) -> bool {
        matches!(self.fields.as_slice(), [only] if only.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub external_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub registration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub index: Option<String>,
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
}

/// Final counters of one run. Never mutated after the step finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub status: BatchStatus,
    pub read_count: u64,
    pub write_count: u64,
    pub skip_count: u64,
    pub filter_count: u64,
    pub commit_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_description: Option<String>,
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == BatchStatus::Completed
    }
}

/// Identifies one logical run of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobParameters {
    pub start_at: i64,
}

static LAST_START_AT: AtomicI64 = AtomicI64::new(0);

impl JobParameters {
    pub fn new(start_at: i64) -> Self {
        Self { start_at }
    }

    /// Current time in milliseconds, bumped so no two calls in this process
    /// ever return the same token.
    pub fn now() -> Self {
        let now = Utc::now().timestamp_millis();
        let mut last = LAST_START_AT.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match LAST_START_AT.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return Self { start_at: next },
                Err(current) => last = current,
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecution {
    pub job_name: String,
    pub parameters: JobParameters,
    pub status: BatchStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub outcome: Option<JobOutcome>,
}

impl JobExecution {
    pub fn new(job_name: impl Into<String>, parameters: JobParameters) -> Self {
        Self {
            job_name: job_name.into(),
            parameters,
            status: BatchStatus::NotStarted,
            start_time: None,
            end_time: None,
            outcome: None,
        }
    }

    pub fn start(&mut self) {
        self.status = BatchStatus::Running;
        self.start_time = Some(Utc::now());
    }

    pub fn finish(&mut self, outcome: JobOutcome) {
        self.status = outcome.status;
        self.end_time = Some(Utc::now());
        self.outcome = Some(outcome);
    }

    /// Used when the job aborted with an error before producing an outcome.
    pub fn fail(&mut self) {
        self.status = BatchStatus::Failed;
        self.end_time = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_line_missing_trailing_field() {
        let line = RawLine::new(3, vec!["2".to_string(), "Bob".to_string()]);
        assert_eq!(line.field(1), Some("Bob"));
        assert_eq!(line.field(4), None);
    }

    #[test]
    fn test_job_parameters_are_unique() {
        let tokens: Vec<i64> = (0..100).map(|_| JobParameters::now().start_at).collect();
        for pair in tokens.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_execution_state_transitions() {
        let mut execution = JobExecution::new("importEmployee", JobParameters::new(1));
        assert_eq!(execution.status, BatchStatus::NotStarted);

        execution.start();
        assert_eq!(execution.status, BatchStatus::Running);
        assert!(execution.start_time.is_some());

        execution.finish(JobOutcome {
            status: BatchStatus::Completed,
            read_count: 3,
            write_count: 3,
            skip_count: 0,
            filter_count: 0,
            commit_count: 1,
            exit_description: None,
        });
        assert_eq!(execution.status, BatchStatus::Completed);
        assert!(execution.end_time.is_some());
    }

    #[test]
    fn test_person_serializes_camel_case() {
        let person = Person {
            id: Some(1),
            user_id: Some("88F7B33d2bcf9f5".to_string()),
            first_name: Some("SHELBY".to_string()),
            ..Person::default()
        };
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(json["userId"], "88F7B33d2bcf9f5");
        assert_eq!(json["firstName"], "SHELBY");
        assert_eq!(json["id"], 1);
    }
}
