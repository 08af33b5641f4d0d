use crate::domain::model::{JobOutcome, JobParameters, RawLine};
use crate::utils::error::{ParseError, Result};
use async_trait::async_trait;

/// Maps one tokenized line onto a typed record.
pub trait LineMapper<T>: Send + Sync {
    fn map_line(&self, line: &RawLine) -> std::result::Result<T, ParseError>;
}

/// Business transformation applied between reading and writing.
///
/// Returning `None` vetoes the item: it is counted as filtered and never written.
pub trait ItemProcessor<T>: Send + Sync {
    fn process(&self, item: T) -> Option<T>;

    /// Absent input stays absent.
    fn process_opt(&self, item: Option<T>) -> Option<T> {
        item.and_then(|item| self.process(item))
    }
}

#[async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Send + Sync,
{
    async fn save(&self, item: &T) -> Result<i64>;

    /// Persists every item in one transaction; nothing is kept if any insert fails.
    async fn save_all(&self, items: &[T]) -> Result<Vec<i64>>;

    async fn find_first_by_order_by_id_asc(&self) -> Result<Option<T>>;

    async fn find_top_by_order_by_id_desc(&self) -> Result<Option<T>>;

    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, parameters: &JobParameters) -> Result<JobOutcome>;
}
