use thiserror::Error;

/// A single input line that could not be mapped to a record.
///
/// Always recoverable: the step skips the line and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Line {line}: field '{field}' {reason}")]
pub struct ParseError {
    pub line: u64,
    pub field: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(line: u64, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error("Chunk {chunk} could not be written: {source}")]
    ChunkFlushError {
        chunk: usize,
        #[source]
        source: Box<BatchError>,
    },

    #[error("Job '{job}' is already running")]
    AlreadyRunning { job: String },

    #[error("Job instance '{job}' with start_at={start_at} already completed or was superseded")]
    InstanceAlreadyComplete { job: String, start_at: i64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Persistence,
    Concurrency,
    Configuration,
    System,
}

impl BatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BatchError::CsvError(_) | BatchError::ParseError(_) => ErrorCategory::Input,
            BatchError::DatabaseError(_) | BatchError::ChunkFlushError { .. } => {
                ErrorCategory::Persistence
            }
            BatchError::AlreadyRunning { .. } | BatchError::InstanceAlreadyComplete { .. } => {
                ErrorCategory::Concurrency
            }
            BatchError::ConfigError { .. } | BatchError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            BatchError::IoError(_) | BatchError::ProcessingError { .. } => ErrorCategory::System,
        }
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_names_line_and_field() {
        let err = ParseError::new(7, "fecha_registro", "must match YYYY-MM-DD");
        assert_eq!(
            err.to_string(),
            "Line 7: field 'fecha_registro' must match YYYY-MM-DD"
        );
    }

    #[test]
    fn test_error_categories() {
        let parse: BatchError = ParseError::new(2, "id_cliente", "is required").into();
        assert_eq!(parse.category(), ErrorCategory::Input);

        let running = BatchError::AlreadyRunning {
            job: "importEmployee".to_string(),
        };
        assert_eq!(running.category(), ErrorCategory::Concurrency);

        let flush = BatchError::ChunkFlushError {
            chunk: 2,
            source: Box::new(BatchError::ProcessingError {
                message: "disk full".to_string(),
            }),
        };
        assert_eq!(flush.category(), ErrorCategory::Persistence);
        assert!(flush.to_string().contains("Chunk 2"));
    }
}
