use serde::{Deserialize, Serialize};
use std::fmt;

/// Confirmation state of a locally cached row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SyncStatus {
    Pending,
    Synced,
    Error,
    Unknown(String),
}

impl SyncStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
            SyncStatus::Unknown(value) => value.as_str(),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for SyncStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => SyncStatus::Pending,
            "synced" => SyncStatus::Synced,
            "error" => SyncStatus::Error,
            other => SyncStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for SyncStatus {
    fn from(value: String) -> Self {
        SyncStatus::from(value.as_str())
    }
}

impl From<SyncStatus> for String {
    fn from(value: SyncStatus) -> Self {
        value.as_str().to_string()
    }
}
