use crate::domain::value_objects::offline::{RowId, SyncTable};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Table-level CRUD of the hosted backend.
///
/// Write calls return the affected rows as the backend represents them. A
/// success response whose body cannot be read is reported as
/// `AppError::DeserializationError`; permanent rejections of the row itself
/// as `AppError::ValidationError`.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    async fn insert(
        &self,
        table: SyncTable,
        row: &Map<String, Value>,
    ) -> Result<Vec<Value>, AppError>;
    async fn upsert(
        &self,
        table: SyncTable,
        row: &Map<String, Value>,
    ) -> Result<Vec<Value>, AppError>;
    async fn delete_by_id(&self, table: SyncTable, id: &RowId) -> Result<(), AppError>;
    async fn select_all(&self, table: SyncTable) -> Result<Vec<Value>, AppError>;
}
