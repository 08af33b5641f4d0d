pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use crate::core::{
    jobs::{employee_job, person_job, FileImportJob},
    launcher::JobLauncher,
};
pub use utils::error::{BatchError, Result};
