pub mod failed_item;
pub mod mirror_record;
pub mod queue_item;
pub mod sync_report;

pub use failed_item::FailedQueueItem;
pub use mirror_record::{MirrorRecord, RecordIndex};
pub use queue_item::{PendingWrite, QueueItem, SyncMutation};
pub use sync_report::{SyncReport, SyncState};
