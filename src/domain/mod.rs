pub mod entities;
pub mod value_objects;

pub use entities::{PendingWrite, QueueItem, SyncReport};
pub use value_objects::{SyncOperation, SyncTable};
