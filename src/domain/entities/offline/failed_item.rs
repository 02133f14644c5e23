use super::QueueItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Queue item pulled out of the queue after a non-retryable failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedQueueItem {
    pub item: QueueItem,
    pub error_message: String,
    pub failed_at: DateTime<Utc>,
}

impl FailedQueueItem {
    pub fn new(item: QueueItem, error_message: String) -> Self {
        Self {
            item,
            error_message,
            failed_at: Utc::now(),
        }
    }
}
