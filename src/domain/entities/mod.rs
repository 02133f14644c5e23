pub mod offline;

pub use offline::{
    FailedQueueItem, MirrorRecord, PendingWrite, QueueItem, RecordIndex, SyncMutation, SyncReport,
    SyncState,
};
