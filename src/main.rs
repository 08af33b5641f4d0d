use batch_runner::adapters::sqlite::{self, SqliteEmployeeRepository, SqlitePersonRepository};
use batch_runner::utils::{logger, validation::Validate};
use batch_runner::{employee_job, person_job, AppState, CliConfig};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置
    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(&config.logging.level, cli.verbose, config.logging.json);

    tracing::info!("Starting batch-runner v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let pool = sqlite::connect(&config.database).await?;
    sqlite::init_schema(&pool).await?;

    let employees = Arc::new(SqliteEmployeeRepository::new(pool.clone()));
    let people = Arc::new(SqlitePersonRepository::new(pool));

    let state = AppState::new(
        employee_job(&config.jobs.employee, employees),
        person_job(&config.jobs.person, people),
    );

    tracing::info!(
        "✅ Jobs ready: '{}' ({}), '{}' ({})",
        config.jobs.employee.name,
        config.jobs.employee.input_path,
        config.jobs.person.name,
        config.jobs.person.input_path
    );

    batch_runner::api::serve(&config, state).await
}
