use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Syncing,
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    pub success_count: u32,
    pub failure_count: u32,
    pub discarded_count: u32,
    pub remaining: u32,
    pub skipped: bool,
    pub error: Option<String>,
}

impl SyncReport {
    /// Returned when a pass is already running.
    pub fn skipped() -> Self {
        Self {
            success: true,
            skipped: true,
            ..Self::default()
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn completed(success_count: u32, failure_count: u32, discarded_count: u32) -> Self {
        Self {
            success: failure_count == 0,
            success_count,
            failure_count,
            discarded_count,
            ..Self::default()
        }
    }

    /// Toast text shown when a pass had failures.
    pub fn summary(&self) -> String {
        format!(
            "{} sincronizados, {} falharam",
            self.success_count, self.failure_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_report_is_successful_only_without_failures() {
        assert!(SyncReport::completed(3, 0, 1).success);
        assert!(!SyncReport::completed(2, 1, 0).success);
    }

    #[test]
    fn serializes_with_camel_case_counts() {
        let value = serde_json::to_value(SyncReport::completed(1, 0, 0)).unwrap();
        assert_eq!(value["successCount"], 1);
        assert_eq!(value["failureCount"], 0);
        assert_eq!(value["success"], true);
    }

    #[test]
    fn summary_matches_toast_format() {
        assert_eq!(SyncReport::completed(2, 1, 0).summary(), "2 sincronizados, 1 falharam");
    }
}
