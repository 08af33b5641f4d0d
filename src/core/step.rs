use crate::core::writer::ChunkWriter;
use crate::domain::model::{BatchStatus, JobOutcome, RawLine};
use crate::domain::ports::{ItemProcessor, LineMapper, Repository};
use crate::utils::error::{BatchError, Result};
use tokio::sync::mpsc;

#[derive(Debug, Default, Clone, Copy)]
struct StepCounters {
    read: u64,
    written: u64,
    skipped: u64,
    filtered: u64,
    commits: u64,
}

impl StepCounters {
    fn into_outcome(self, status: BatchStatus, exit_description: Option<String>) -> JobOutcome {
        JobOutcome {
            status,
            read_count: self.read,
            write_count: self.written,
            skip_count: self.skipped,
            filter_count: self.filtered,
            commit_count: self.commits,
            exit_description,
        }
    }
}

/// Chunk-oriented read → process → write loop over one input.
///
/// Lines that fail to map are skipped and counted. The first chunk that
/// fails to persist ends the step as `FAILED` without reading further.
pub struct ChunkStep<'a, T, M: ?Sized, P: ?Sized, R: ?Sized> {
    name: &'a str,
    mapper: &'a M,
    processor: &'a P,
    writer: ChunkWriter<T, R>,
}

impl<'a, T, M, P, R> ChunkStep<'a, T, M, P, R>
where
    T: Send + Sync,
    M: LineMapper<T> + ?Sized,
    P: ItemProcessor<T> + ?Sized,
    R: Repository<T> + ?Sized,
{
    pub fn new(name: &'a str, mapper: &'a M, processor: &'a P, writer: ChunkWriter<T, R>) -> Self {
        Self {
            name,
            mapper,
            processor,
            writer,
        }
    }

    /// Runs the step until `lines` is closed.
    ///
    /// `Err` is only returned when the source itself cannot be read; chunk
    /// failures are reported through the outcome status. Returning early
    /// drops `lines`, which stops the reader.
    pub async fn run(mut self, mut lines: mpsc::Receiver<Result<RawLine>>) -> Result<JobOutcome> {
        let mut counters = StepCounters::default();
        tracing::info!(
            "▶️ Step '{}' started (chunk size {})",
            self.name,
            self.writer.capacity()
        );

        while let Some(line) = lines.recv().await {
            let line = line?;
            counters.read += 1;

            let item = match self.mapper.map_line(&line) {
                Ok(item) => item,
                Err(e) => {
                    counters.skipped += 1;
                    tracing::warn!("⚠️ Skipping line: {}", e);
                    continue;
                }
            };

            let Some(item) = self.processor.process(item) else {
                counters.filtered += 1;
                tracing::debug!("Line {} filtered by processor", line.line_number);
                continue;
            };

            if self.writer.append(item) {
                if let Err(e) = self.write_chunk(&mut counters).await {
                    return Ok(self.failed(counters, e));
                }
            }
        }

        if let Err(e) = self.write_chunk(&mut counters).await {
            return Ok(self.failed(counters, e));
        }

        tracing::info!(
            "✅ Step '{}' completed: read={}, written={}, skipped={}, filtered={}, commits={}",
            self.name,
            counters.read,
            counters.written,
            counters.skipped,
            counters.filtered,
            counters.commits
        );

        Ok(counters.into_outcome(BatchStatus::Completed, None))
    }

    async fn write_chunk(&mut self, counters: &mut StepCounters) -> Result<()> {
        if self.writer.is_empty() {
            return Ok(());
        }
        let written = self.writer.flush().await?;
        counters.written += written as u64;
        counters.commits += 1;
        Ok(())
    }

    fn failed(&self, counters: StepCounters, error: BatchError) -> JobOutcome {
        tracing::error!(
            "❌ Step '{}' failed after read={}, written={}: {}",
            self.name,
            counters.read,
            counters.written,
            error
        );
        counters.into_outcome(BatchStatus::Failed, Some(error.to_string()))
    }
}
