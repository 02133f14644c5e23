//! Offline write queue and sync manager for the inspection app.

// モジュール定義
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::services::{MirrorCacheService, RetryPolicy, SyncExecutor, SyncManager};
pub use domain::entities::{PendingWrite, QueueItem, SyncReport};
pub use shared::error::{AppError, SyncError};
pub use shared::logging::{init_json_logging, init_logging};
pub use state::{AppState, WriteOutcome};
