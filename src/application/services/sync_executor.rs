use crate::application::ports::remote_backend::RemoteBackend;
use crate::domain::entities::offline::{PendingWrite, SyncMutation};
use crate::domain::value_objects::offline::{RowId, RowPayload, SyncOperation, SyncTable};
use crate::shared::error::{AppError, SyncError};
use std::sync::Arc;

/// Turns one write into exactly one backend call.
#[derive(Clone)]
pub struct SyncExecutor {
    backend: Arc<dyn RemoteBackend>,
}

impl SyncExecutor {
    pub fn new(backend: Arc<dyn RemoteBackend>) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, write: &PendingWrite) -> Result<RowId, SyncError> {
        match &write.mutation {
            SyncMutation::Insert { data } => self.insert(write.table, data).await,
            SyncMutation::Update { data, .. } => self.update(write.table, data).await,
            SyncMutation::Delete { id } => {
                self.delete(write.table, &RowPayload::with_id(id)).await
            }
        }
    }

    /// Creates the row. A success response without an identifiable row is a
    /// hard failure: retrying it could create a duplicate.
    pub async fn insert(&self, table: SyncTable, data: &RowPayload) -> Result<RowId, SyncError> {
        let missing_id = || SyncError::missing_id(table.as_str(), SyncOperation::Insert);
        let result = match self.backend.insert(table, data.as_map()).await {
            Ok(rows) => first_row_id(&rows).ok_or_else(missing_id),
            // 2xx だが本文が読めない: 行は作成済みの可能性がある
            Err(AppError::DeserializationError(_)) => Err(missing_id()),
            Err(err) => Err(SyncError::Backend(err)),
        };
        log_outcome(table, SyncOperation::Insert, &result);
        result
    }

    pub async fn update(&self, table: SyncTable, data: &RowPayload) -> Result<RowId, SyncError> {
        let result = match data.id() {
            Some(id) => self
                .backend
                .upsert(table, data.as_map())
                .await
                .map(|_| id)
                .map_err(SyncError::Backend),
            None => Err(SyncError::missing_id(table.as_str(), SyncOperation::Update)),
        };
        log_outcome(table, SyncOperation::Update, &result);
        result
    }

    pub async fn delete(&self, table: SyncTable, data: &RowPayload) -> Result<RowId, SyncError> {
        let result = match data.id() {
            Some(id) => self
                .backend
                .delete_by_id(table, &id)
                .await
                .map(|_| id)
                .map_err(SyncError::Backend),
            None => Err(SyncError::missing_id(table.as_str(), SyncOperation::Delete)),
        };
        log_outcome(table, SyncOperation::Delete, &result);
        result
    }

    pub async fn select_all(&self, table: SyncTable) -> Result<Vec<serde_json::Value>, AppError> {
        self.backend.select_all(table).await
    }
}

fn first_row_id(rows: &[serde_json::Value]) -> Option<RowId> {
    rows.first()
        .and_then(|row| row.get("id"))
        .and_then(RowId::from_json)
}

fn log_outcome(table: SyncTable, operation: SyncOperation, result: &Result<RowId, SyncError>) {
    match result {
        Ok(id) => tracing::debug!(
            target: "sync::executor",
            table = %table,
            operation = %operation,
            row_id = %id,
            outcome = "ok",
            "remote write applied"
        ),
        Err(err) => tracing::warn!(
            target: "sync::executor",
            table = %table,
            operation = %operation,
            outcome = "error",
            error = %err,
            "remote write failed"
        ),
    }
}
