#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use batch_runner::adapters::sqlite;
use batch_runner::config::{DatabaseConfig, JobConfig};
use batch_runner::domain::ports::Repository;
use batch_runner::{BatchError, Result};
use sqlx::SqlitePool;
use std::path::Path;
use tokio::sync::{Mutex, Notify};
use tower::ServiceExt;

pub const EMPLOYEE_HEADER: &str = "id_cliente,nombre,apellido,email,fecha_registro";
pub const PERSON_HEADER: &str =
    "Index,User Id,First Name,Last Name,Sex,Email,Phone,Date of birth,Job Title";

pub async fn memory_pool() -> SqlitePool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let pool = sqlite::connect(&config).await.unwrap();
    sqlite::init_schema(&pool).await.unwrap();
    pool
}

/// Writes `header` plus `lines` into `dir/name` and returns a job config for it.
pub fn job_file(dir: &Path, job: &str, name: &str, header: &str, lines: &[&str]) -> JobConfig {
    let mut content = format!("{}\n", header);
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    JobConfig::new(job, path.to_string_lossy().into_owned())
}

pub async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// In-memory store whose `save_all` can be held open, or made to fail.
pub struct TestRepository<T> {
    pub rows: Mutex<Vec<T>>,
    pub save_calls: Mutex<usize>,
    pub entered: Notify,
    pub release: Notify,
    gated: bool,
    failing: bool,
}

impl<T> TestRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            save_calls: Mutex::new(0),
            entered: Notify::new(),
            release: Notify::new(),
            gated: false,
            failing: false,
        }
    }

    /// Every `save_all` signals `entered` and then waits for `release`.
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl<T> Repository<T> for TestRepository<T>
where
    T: Clone + Send + Sync,
{
    async fn save(&self, item: &T) -> Result<i64> {
        let ids = self.save_all(std::slice::from_ref(item)).await?;
        Ok(ids[0])
    }

    async fn save_all(&self, items: &[T]) -> Result<Vec<i64>> {
        *self.save_calls.lock().await += 1;

        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if self.failing {
            return Err(BatchError::ProcessingError {
                message: "store rejected chunk".to_string(),
            });
        }

        let mut rows = self.rows.lock().await;
        let start = rows.len() as i64;
        rows.extend_from_slice(items);
        Ok((start + 1..=start + items.len() as i64).collect())
    }

    async fn find_first_by_order_by_id_asc(&self) -> Result<Option<T>> {
        Ok(self.rows.lock().await.first().cloned())
    }

    async fn find_top_by_order_by_id_desc(&self) -> Result<Option<T>> {
        Ok(self.rows.lock().await.last().cloned())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rows.lock().await.len() as i64)
    }
}
