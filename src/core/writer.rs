use crate::domain::ports::Repository;
use crate::utils::error::{BatchError, Result};
use std::sync::Arc;

pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Buffers items and hands each full chunk to the repository as a single
/// transactional `save_all` call.
pub struct ChunkWriter<T, R: ?Sized> {
    repository: Arc<R>,
    buffer: Vec<T>,
    capacity: usize,
    chunks_attempted: usize,
}

impl<T, R> ChunkWriter<T, R>
where
    T: Send + Sync,
    R: Repository<T> + ?Sized,
{
    pub fn new(repository: Arc<R>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            repository,
            buffer: Vec::with_capacity(capacity),
            capacity,
            chunks_attempted: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }

    /// Adds an item; returns `true` once the chunk has reached capacity.
    pub fn append(&mut self, item: T) -> bool {
        self.buffer.push(item);
        self.is_full()
    }

    /// Writes the buffered chunk and clears it.
    ///
    /// Returns how many items were persisted. On failure nothing from this
    /// chunk is kept and the error is wrapped in [`BatchError::ChunkFlushError`].
    pub async fn flush(&mut self) -> Result<usize> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        self.chunks_attempted += 1;
        let chunk = self.chunks_attempted;
        let size = self.buffer.len();

        tracing::debug!("Flushing chunk {} ({} items)", chunk, size);
        let result = self.repository.save_all(&self.buffer).await;
        self.buffer.clear();

        match result {
            Ok(ids) => {
                tracing::debug!("Chunk {} committed ({} rows)", chunk, ids.len());
                Ok(size)
            }
            Err(e) => Err(BatchError::ChunkFlushError {
                chunk,
                source: Box::new(e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingRepository {
        batches: Mutex<Vec<Vec<u32>>>,
        fail: bool,
    }

    #[async_trait]
    impl Repository<u32> for RecordingRepository {
        async fn save(&self, item: &u32) -> Result<i64> {
            self.save_all(std::slice::from_ref(item))
                .await
                .map(|ids| ids[0])
        }

        async fn save_all(&self, items: &[u32]) -> Result<Vec<i64>> {
            if self.fail {
                return Err(BatchError::ProcessingError {
                    message: "store unavailable".to_string(),
                });
            }
            let mut batches = self.batches.lock().await;
            batches.push(items.to_vec());
            Ok(items.iter().map(|i| *i as i64).collect())
        }

        async fn find_first_by_order_by_id_asc(&self) -> Result<Option<u32>> {
            Ok(self.batches.lock().await.first().and_then(|b| b.first().copied()))
        }

        async fn find_top_by_order_by_id_desc(&self) -> Result<Option<u32>> {
            Ok(self.batches.lock().await.last().and_then(|b| b.last().copied()))
        }

        async fn count(&self) -> Result<i64> {
            Ok(self.batches.lock().await.iter().map(|b| b.len() as i64).sum())
        }
    }

    #[tokio::test]
    async fn test_append_reports_full_at_capacity() {
        let repo = Arc::new(RecordingRepository::default());
        let mut writer: ChunkWriter<u32, _> = ChunkWriter::new(repo.clone(), 3);

        assert!(!writer.append(1));
        assert!(!writer.append(2));
        assert!(writer.append(3));
        assert_eq!(writer.flush().await.unwrap(), 3);
        assert!(writer.is_empty());

        assert_eq!(*repo.batches.lock().await, vec![vec![1, 2, 3]]);
    }

    #[tokio::test]
    async fn test_empty_flush_does_not_touch_repository() {
        let repo = Arc::new(RecordingRepository::default());
        let mut writer: ChunkWriter<u32, _> = ChunkWriter::new(repo.clone(), 10);

        assert_eq!(writer.flush().await.unwrap(), 0);
        assert!(repo.batches.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_flush_is_wrapped_and_buffer_cleared() {
        let repo = Arc::new(RecordingRepository {
            fail: true,
            ..Default::default()
        });
        let mut writer: ChunkWriter<u32, _> = ChunkWriter::new(repo, 2);
        writer.append(1);

        let err = writer.flush().await.unwrap_err();
        assert!(matches!(err, BatchError::ChunkFlushError { chunk: 1, .. }));
        assert!(writer.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let repo = Arc::new(RecordingRepository::default());
        let writer: ChunkWriter<u32, _> = ChunkWriter::new(repo, 0);
        assert_eq!(writer.capacity(), 1);
    }
}
