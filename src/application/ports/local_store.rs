use crate::domain::entities::offline::{FailedQueueItem, MirrorRecord, QueueItem, RecordIndex};
use crate::domain::value_objects::offline::{QueueItemId, SyncTable};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable local storage: one mirror partition per table, the sync queue and
/// the dead-letter list.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn put_record(&self, table: SyncTable, record: &MirrorRecord) -> Result<(), AppError>;
    async fn get_record(
        &self,
        table: SyncTable,
        id: &str,
    ) -> Result<Option<MirrorRecord>, AppError>;
    async fn get_all(&self, table: SyncTable) -> Result<Vec<MirrorRecord>, AppError>;
    async fn get_by_index(
        &self,
        table: SyncTable,
        index: RecordIndex,
        value: &str,
    ) -> Result<Vec<MirrorRecord>, AppError>;
    /// Returns false when the row was not cached.
    async fn remove_record(&self, table: SyncTable, id: &str) -> Result<bool, AppError>;

    /// Upsert by id. An existing item keeps its queue position.
    async fn put_queue_item(&self, item: &QueueItem) -> Result<(), AppError>;
    /// Items in enqueue order.
    async fn list_queue_items(&self) -> Result<Vec<QueueItem>, AppError>;
    async fn remove_queue_item(&self, id: &QueueItemId) -> Result<bool, AppError>;
    async fn count_queue_items(&self) -> Result<u64, AppError>;

    async fn put_failed_item(&self, item: &FailedQueueItem) -> Result<(), AppError>;
    async fn list_failed_items(&self) -> Result<Vec<FailedQueueItem>, AppError>;
    async fn remove_failed_item(&self, id: &QueueItemId) -> Result<bool, AppError>;

    async fn close(&self);
}
