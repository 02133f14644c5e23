use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

pub const UNSET_TS: u64 = 0;

#[derive(Debug)]
pub struct AtomicMetric {
    success: AtomicU64,
    failure: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomicSnapshot {
    pub successes: u64,
    pub failures: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
}

impl AtomicMetric {
    pub const fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(UNSET_TS),
            last_failure_ms: AtomicU64::new(UNSET_TS),
        }
    }

    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
        self.last_success_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failure.fetch_add(1, Ordering::Relaxed);
        self.last_failure_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AtomicSnapshot {
        AtomicSnapshot {
            successes: self.success.load(Ordering::Relaxed),
            failures: self.failure.load(Ordering::Relaxed),
            last_success_ms: timestamp_to_option(self.last_success_ms.load(Ordering::Relaxed)),
            last_failure_ms: timestamp_to_option(self.last_failure_ms.load(Ordering::Relaxed)),
        }
    }
}

impl Default for AtomicMetric {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetricsSnapshot {
    pub items_synced: u64,
    pub items_failed: u64,
    pub items_discarded: u64,
    pub passes_completed: u64,
    pub passes_failed: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
    pub last_pass_duration_ms: Option<u64>,
}

/// Per-manager counters. Each sync manager owns its own instance.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    items: AtomicMetric,
    passes: AtomicMetric,
    discarded: AtomicU64,
    last_pass_duration_ms: Mutex<Option<u64>>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_item_success(&self) {
        self.items.record_success();
    }

    pub fn record_item_failure(&self) {
        self.items.record_failure();
    }

    pub fn record_discard(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pass(&self, succeeded: bool, duration_ms: u64) {
        if succeeded {
            self.passes.record_success();
        } else {
            self.passes.record_failure();
        }
        if let Ok(mut guard) = self.last_pass_duration_ms.lock() {
            *guard = Some(duration_ms);
        }
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        let items = self.items.snapshot();
        let passes = self.passes.snapshot();
        let last_pass_duration_ms = self
            .last_pass_duration_ms
            .lock()
            .map(|guard| *guard)
            .unwrap_or(None);

        SyncMetricsSnapshot {
            items_synced: items.successes,
            items_failed: items.failures,
            items_discarded: self.discarded.load(Ordering::Relaxed),
            passes_completed: passes.successes,
            passes_failed: passes.failures,
            last_success_ms: passes.last_success_ms,
            last_failure_ms: passes.last_failure_ms,
            last_pass_duration_ms,
        }
    }
}

#[inline]
pub fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(UNSET_TS)
}

#[inline]
pub fn timestamp_to_option(value: u64) -> Option<u64> {
    if value == UNSET_TS { None } else { Some(value) }
}
