use crate::domain::value_objects::offline::SyncOperation;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Database(String),
    Network(String),
    Storage(String),
    Unauthorized(String),
    ValidationError(String),
    ConfigurationError(String),
    SerializationError(String),
    DeserializationError(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors raised while replaying queued writes against the backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Invalid sync table: {0}")]
    InvalidTable(String),

    #[error("Invalid sync operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid sync payload: {0}")]
    InvalidPayload(String),

    #[error("Missing row id for {operation} on {table}")]
    MissingId {
        table: String,
        operation: SyncOperation,
    },

    #[error("Backend error: {0}")]
    Backend(AppError),

    #[error("Local store unavailable: {0}")]
    StoreUnavailable(String),
}

impl SyncError {
    pub fn missing_id(table: impl Into<String>, operation: SyncOperation) -> Self {
        SyncError::MissingId {
            table: table.into(),
            operation,
        }
    }

    /// Backend failures may succeed on a later attempt, unless the backend
    /// rejected the row itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Backend(AppError::ValidationError(_)) => false,
            SyncError::Backend(_) => true,
            _ => false,
        }
    }

    /// Entries that cannot be routed to any table or operation.
    pub fn is_discardable(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidTable(_) | SyncError::InvalidOperation(_)
        )
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Backend(inner) => inner,
            SyncError::StoreUnavailable(msg) => AppError::Storage(msg),
            other => AppError::ValidationError(other.to_string()),
        }
    }
}
