pub mod report;

use crate::config::AppConfig;
use crate::core::jobs::{EmployeeJob, PersonJob};
use crate::core::launcher::JobLauncher;
use crate::domain::model::{JobParameters, Person};
use crate::domain::ports::{Job, Repository};
use crate::utils::error::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use self::report::{JobReport, RecordReport, TextReport};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared by every handler; jobs and launcher are built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub launcher: Arc<JobLauncher>,
    pub employee_job: Arc<EmployeeJob>,
    pub person_job: Arc<PersonJob>,
}

impl AppState {
    pub fn new(employee_job: EmployeeJob, person_job: PersonJob) -> Self {
        Self {
            launcher: Arc::new(JobLauncher::new()),
            employee_job: Arc::new(employee_job),
            person_job: Arc::new(person_job),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/employee/set", post(set_employee))
        .route("/jobs/importdata", post(import_data))
        .route("/jobs/latest", get(latest_person))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &AppConfig, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn no_body() -> Result<Option<()>> {
    Ok(None)
}

/// `POST /employee/set`
async fn set_employee(State(state): State<AppState>) -> TextReport {
    let job = state.employee_job.as_ref();
    let result = state.launcher.run(job, JobParameters::now()).await;

    TextReport(JobReport::from_result(job.name(), result, no_body).await)
}

/// `POST /jobs/importdata`: on success answers with the first stored person.
async fn import_data(State(state): State<AppState>) -> RecordReport<Person> {
    let job = state.person_job.as_ref();
    let result = state.launcher.run(job, JobParameters::now()).await;
    let repository = job.repository();

    RecordReport(
        JobReport::from_result(job.name(), result, || {
            repository.find_first_by_order_by_id_asc()
        })
        .await,
    )
}

/// `GET /jobs/latest`: most recently stored person, 204 when there is none.
async fn latest_person(State(state): State<AppState>) -> RecordReport<Person> {
    match state.person_job.repository().find_top_by_order_by_id_desc().await {
        Ok(person) => RecordReport(JobReport::Completed(person)),
        Err(e) => {
            tracing::error!("❌ Latest person lookup failed: {}", e);
            RecordReport(JobReport::Error)
        }
    }
}
