pub mod offline;

pub use offline::{
    ALLOWED_TABLES, QueueItemId, RowId, RowPayload, SyncOperation, SyncStatus, SyncTable,
    is_valid_table, validated_table,
};
