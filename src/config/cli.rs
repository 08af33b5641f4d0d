use crate::config::AppConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "batch-runner")]
#[command(about = "Chunked CSV import jobs behind an HTTP trigger")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub database_url: Option<String>,

    /// Log everything from this crate at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    /// Loads the configuration file (if any) and applies command-line overrides.
    pub fn load(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }

        Ok(config)
    }
}
