use crate::core::writer::DEFAULT_CHUNK_SIZE;
use crate::utils::error::{BatchError, Result};
use crate::utils::validation::{
    validate_database_url, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://batch-runner.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub employee: JobConfig,
    pub person: JobConfig,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            employee: JobConfig::new("importEmployee", "data/employee.csv"),
            person: JobConfig::new("importPersons", "data/people.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub input_path: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl JobConfig {
    pub fn new(name: impl Into<String>, input_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_path: input_path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            delimiter: default_delimiter(),
        }
    }

    /// First byte of the configured delimiter; validation guarantees a single ASCII char.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.bytes().next().unwrap_or(b',')
    }

    fn validate_as(&self, section: &str) -> Result<()> {
        validate_non_empty_string(&format!("{}.name", section), &self.name)?;
        validate_path(&format!("{}.input_path", section), &self.input_path)?;
        validate_positive_number(&format!("{}.chunk_size", section), self.chunk_size, 1)?;

        if self.delimiter.len() != 1 || !self.delimiter.is_ascii() {
            return Err(BatchError::InvalidConfigValueError {
                field: format!("{}.delimiter", section),
                value: self.delimiter.clone(),
                reason: "Delimiter must be a single ASCII character".to_string(),
            });
        }
        Ok(())
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BatchError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATABASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BatchError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validate_database_url("database.url", &self.database.url)?;
        validate_range("database.max_connections", self.database.max_connections, 1, 100)?;

        self.jobs.employee.validate_as("jobs.employee")?;
        self.jobs.person.validate_as("jobs.person")?;

        // 兩個 job 共用同一個名稱會讓執行鎖互相阻擋
        if self.jobs.employee.name == self.jobs.person.name {
            return Err(BatchError::InvalidConfigValueError {
                field: "jobs.person.name".to_string(),
                value: self.jobs.person.name.clone(),
                reason: "Job names must be unique".to_string(),
            });
        }

        Ok(())
    }
}
