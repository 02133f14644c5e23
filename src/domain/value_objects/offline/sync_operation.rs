use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SyncOperation {
    Insert,
    Update,
    Delete,
    Unknown(String),
}

impl SyncOperation {
    pub fn as_str(&self) -> &str {
        match self {
            SyncOperation::Insert => "insert",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
            SyncOperation::Unknown(value) => value.as_str(),
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SyncOperation {
    fn from(value: &str) -> Self {
        match value {
            "insert" => SyncOperation::Insert,
            "update" => SyncOperation::Update,
            "delete" => SyncOperation::Delete,
            other => SyncOperation::Unknown(other.to_string()),
        }
    }
}

impl From<String> for SyncOperation {
    fn from(value: String) -> Self {
        SyncOperation::from(value.as_str())
    }
}

impl From<SyncOperation> for String {
    fn from(value: SyncOperation) -> Self {
        value.as_str().to_string()
    }
}
