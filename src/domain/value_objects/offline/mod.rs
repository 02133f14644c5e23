pub mod queue_item_id;
pub mod row_id;
pub mod row_payload;
pub mod sync_operation;
pub mod sync_status;
pub mod sync_table;

pub use queue_item_id::QueueItemId;
pub use row_id::RowId;
pub use row_payload::RowPayload;
pub use sync_operation::SyncOperation;
pub use sync_status::SyncStatus;
pub use sync_table::{ALLOWED_TABLES, SyncTable, is_valid_table, validated_table};
