pub mod mirror_cache_service;
pub mod sync_executor;
pub mod sync_manager;

pub use mirror_cache_service::MirrorCacheService;
pub use sync_executor::SyncExecutor;
pub use sync_manager::{RetryPolicy, SyncManager};
