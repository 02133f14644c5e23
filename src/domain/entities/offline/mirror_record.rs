use crate::domain::value_objects::offline::{RowId, RowPayload, SyncStatus, SyncTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local copy of a remote row, kept for reads while offline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorRecord {
    pub id: RowId,
    pub table: SyncTable,
    pub data: RowPayload,
    pub sync_status: SyncStatus,
    pub updated_at: DateTime<Utc>,
}

impl MirrorRecord {
    pub fn new(id: RowId, table: SyncTable, data: RowPayload, sync_status: SyncStatus) -> Self {
        Self {
            id,
            table,
            data,
            sync_status,
            updated_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, sync_status: SyncStatus) -> Self {
        self.sync_status = sync_status;
        self.updated_at = Utc::now();
        self
    }
}

/// Secondary lookups supported by the mirror partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordIndex {
    SyncStatus,
}

impl RecordIndex {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordIndex::SyncStatus => "sync_status",
        }
    }
}
