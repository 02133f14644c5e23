use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueueItemRow {
    pub seq: i64,
    pub id: String,
    pub table_name: String,
    pub operation: String,
    pub data: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MirrorRecordRow {
    pub partition_name: String,
    pub id: String,
    pub data: String,
    pub sync_status: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncFailureRow {
    pub id: String,
    pub table_name: String,
    pub operation: String,
    pub data: String,
    pub timestamp: i64,
    pub error_message: String,
    pub failed_at: i64,
}
