use crate::config::JobConfig;
use crate::core::mapper::{EmployeeLineMapper, PersonLineMapper};
use crate::core::processor::{EmployeeProcessor, PersonProcessor};
use crate::core::reader::CsvLineSource;
use crate::core::step::ChunkStep;
use crate::core::writer::ChunkWriter;
use crate::domain::model::{Employee, JobOutcome, JobParameters, Person};
use crate::domain::ports::{ItemProcessor, Job, LineMapper, Repository};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Single-step job that imports one delimited file into a repository.
pub struct FileImportJob<T, M, P> {
    name: String,
    input_path: PathBuf,
    delimiter: u8,
    chunk_size: usize,
    mapper: M,
    processor: P,
    repository: Arc<dyn Repository<T>>,
}

impl<T, M, P> FileImportJob<T, M, P>
where
    T: Send + Sync + 'static,
    M: LineMapper<T>,
    P: ItemProcessor<T>,
{
    pub fn new(
        config: &JobConfig,
        mapper: M,
        processor: P,
        repository: Arc<dyn Repository<T>>,
    ) -> Self {
        Self {
            name: config.name.clone(),
            input_path: PathBuf::from(&config.input_path),
            delimiter: config.delimiter_byte(),
            chunk_size: config.chunk_size,
            mapper,
            processor,
            repository,
        }
    }

    pub fn repository(&self) -> &Arc<dyn Repository<T>> {
        &self.repository
    }
}

#[async_trait]
impl<T, M, P> Job for FileImportJob<T, M, P>
where
    T: Send + Sync + 'static,
    M: LineMapper<T>,
    P: ItemProcessor<T>,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, parameters: &JobParameters) -> Result<JobOutcome> {
        tracing::info!(
            "📁 Job '{}' reading {} (start_at={})",
            self.name,
            self.input_path.display(),
            parameters.start_at
        );

        let lines =
            CsvLineSource::spawn_from_path(self.input_path.clone(), self.delimiter, self.chunk_size);
        let writer = ChunkWriter::new(Arc::clone(&self.repository), self.chunk_size);
        let step_name = format!("{}-step", self.name);

        ChunkStep::new(&step_name, &self.mapper, &self.processor, writer)
            .run(lines)
            .await
    }
}

pub type EmployeeJob = FileImportJob<Employee, EmployeeLineMapper, EmployeeProcessor>;
pub type PersonJob = FileImportJob<Person, PersonLineMapper, PersonProcessor>;

pub fn employee_job(config: &JobConfig, repository: Arc<dyn Repository<Employee>>) -> EmployeeJob {
    FileImportJob::new(config, EmployeeLineMapper, EmployeeProcessor, repository)
}

pub fn person_job(config: &JobConfig, repository: Arc<dyn Repository<Person>>) -> PersonJob {
    FileImportJob::new(config, PersonLineMapper, PersonProcessor, repository)
}
