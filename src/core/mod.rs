pub mod jobs;
pub mod launcher;
pub mod mapper;
pub mod processor;
pub mod reader;
pub mod step;
pub mod writer;

pub use crate::domain::model::{
    BatchStatus, Employee, JobExecution, JobOutcome, JobParameters, Person, RawLine,
};
pub use crate::domain::ports::{ItemProcessor, Job, LineMapper, Repository};
pub use crate::utils::error::Result;
