use crate::domain::value_objects::offline::{
    QueueItemId, RowId, RowPayload, SyncOperation, SyncTable, validated_table,
};
use crate::shared::error::SyncError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Durable record of one pending remote write.
///
/// `table` stays a raw string so that stale entries written by older builds
/// can still be read back and discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub table: String,
    pub operation: SyncOperation,
    pub data: Value,
    pub timestamp: i64,
}

impl QueueItem {
    pub fn new(
        id: QueueItemId,
        table: String,
        operation: SyncOperation,
        data: Value,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            table,
            operation,
            data,
            timestamp,
        }
    }

    pub fn from_write(write: &PendingWrite) -> Self {
        Self::with_id(QueueItemId::generate(), write)
    }

    pub fn with_id(id: QueueItemId, write: &PendingWrite) -> Self {
        Self {
            id,
            table: write.table.as_str().to_string(),
            operation: write.operation(),
            data: write.data().to_value(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Validates the stored fields back into a typed write.
    pub fn to_write(&self) -> Result<PendingWrite, SyncError> {
        let table = validated_table(&self.table)?;
        let data = RowPayload::new(self.data.clone()).map_err(SyncError::InvalidPayload)?;

        match &self.operation {
            SyncOperation::Insert => PendingWrite::insert(table, data),
            SyncOperation::Update => PendingWrite::update(table, data),
            SyncOperation::Delete => {
                let id = data
                    .id()
                    .ok_or_else(|| SyncError::missing_id(table.as_str(), SyncOperation::Delete))?;
                Ok(PendingWrite::delete(table, id))
            }
            SyncOperation::Unknown(other) => Err(SyncError::InvalidOperation(other.clone())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum SyncMutation {
    Insert { data: RowPayload },
    Update { id: RowId, data: RowPayload },
    Delete { id: RowId },
}

/// A write validated against the table schema, ready to queue or execute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingWrite {
    pub table: SyncTable,
    pub mutation: SyncMutation,
}

impl PendingWrite {
    pub fn insert(table: SyncTable, data: RowPayload) -> Result<Self, SyncError> {
        let missing = data.missing_fields(table.required_insert_fields());
        if !missing.is_empty() {
            return Err(SyncError::InvalidPayload(format!(
                "{} insert is missing {}",
                table,
                missing.join(", ")
            )));
        }
        Ok(Self {
            table,
            mutation: SyncMutation::Insert { data },
        })
    }

    pub fn update(table: SyncTable, data: RowPayload) -> Result<Self, SyncError> {
        let id = data
            .id()
            .ok_or_else(|| SyncError::missing_id(table.as_str(), SyncOperation::Update))?;
        Ok(Self {
            table,
            mutation: SyncMutation::Update { id, data },
        })
    }

    pub fn delete(table: SyncTable, id: RowId) -> Self {
        Self {
            table,
            mutation: SyncMutation::Delete { id },
        }
    }

    pub fn operation(&self) -> SyncOperation {
        match self.mutation {
            SyncMutation::Insert { .. } => SyncOperation::Insert,
            SyncMutation::Update { .. } => SyncOperation::Update,
            SyncMutation::Delete { .. } => SyncOperation::Delete,
        }
    }

    /// Row the write targets, when it is known before execution.
    pub fn row_id(&self) -> Option<RowId> {
        match &self.mutation {
            SyncMutation::Insert { data } => data.id(),
            SyncMutation::Update { id, .. } | SyncMutation::Delete { id } => Some(id.clone()),
        }
    }

    pub fn data(&self) -> RowPayload {
        match &self.mutation {
            SyncMutation::Insert { data } | SyncMutation::Update { data, .. } => data.clone(),
            SyncMutation::Delete { id } => RowPayload::with_id(id),
        }
    }
}
