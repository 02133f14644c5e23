use crate::application::ports::local_store::LocalStore;
use crate::application::services::sync_executor::SyncExecutor;
use crate::domain::entities::offline::{
    FailedQueueItem, PendingWrite, QueueItem, SyncReport, SyncState,
};
use crate::domain::value_objects::offline::{QueueItemId, RowId, SyncStatus, SyncTable};
use crate::shared::config::SyncConfig;
use crate::shared::error::{AppError, SyncError};
use crate::shared::metrics::{SyncMetrics, SyncMetricsSnapshot};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, RwLock, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const REPORT_CHANNEL_CAPACITY: usize = 16;

/// Bounded retry inside a single pass: attempt `n` waits `base_delay * n`
/// before attempt `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.max_retry,
            Duration::from_millis(config.retry_base_delay_ms),
        )
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1_000))
    }
}

struct PassGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Default)]
struct PassTally {
    succeeded: u32,
    failed: u32,
    discarded: u32,
    parked: u32,
}

/// Drains the durable queue against the backend.
pub struct SyncManager {
    store: Arc<dyn LocalStore>,
    executor: SyncExecutor,
    policy: RetryPolicy,
    syncing: AtomicBool,
    metrics: SyncMetrics,
    last_report: RwLock<Option<SyncReport>>,
    reports: broadcast::Sender<SyncReport>,
    // キュー追加を自動同期タスクへ知らせる
    queued: Notify,
}

impl SyncManager {
    pub fn new(store: Arc<dyn LocalStore>, executor: SyncExecutor, policy: RetryPolicy) -> Self {
        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        Self {
            store,
            executor,
            policy,
            syncing: AtomicBool::new(false),
            metrics: SyncMetrics::new(),
            last_report: RwLock::new(None),
            reports,
            queued: Notify::new(),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn enqueue(&self, write: &PendingWrite) -> Result<QueueItem, AppError> {
        let item = QueueItem::from_write(write);
        self.store.put_queue_item(&item).await?;
        tracing::info!(
            target: "sync::manager",
            item_id = %item.id,
            table = %item.table,
            operation = %item.operation,
            "write queued"
        );
        self.queued.notify_one();
        Ok(item)
    }

    /// Validates a stored-shape item before queueing it. Re-putting an id
    /// replaces the earlier entry.
    pub async fn enqueue_item(&self, item: &QueueItem) -> Result<(), AppError> {
        item.to_write()?;
        self.store.put_queue_item(item).await?;
        self.queued.notify_one();
        Ok(())
    }

    pub async fn pending_items(&self) -> Result<Vec<QueueItem>, AppError> {
        self.store.list_queue_items().await
    }

    pub async fn pending_count(&self) -> Result<u64, AppError> {
        self.store.count_queue_items().await
    }

    pub async fn failed_items(&self) -> Result<Vec<FailedQueueItem>, AppError> {
        self.store.list_failed_items().await
    }

    /// Moves a dead-lettered item to the back of the queue.
    pub async fn requeue_failed(&self, id: &QueueItemId) -> Result<bool, AppError> {
        let failed = self.store.list_failed_items().await?;
        let Some(entry) = failed.into_iter().find(|entry| &entry.item.id == id) else {
            return Ok(false);
        };

        self.store.put_queue_item(&entry.item).await?;
        self.store.remove_failed_item(id).await?;
        tracing::info!(
            target: "sync::manager",
            item_id = %id,
            table = %entry.item.table,
            "dead-lettered item requeued"
        );
        self.queued.notify_one();
        Ok(true)
    }

    pub fn state(&self) -> SyncState {
        if self.syncing.load(Ordering::Acquire) {
            SyncState::Syncing
        } else {
            SyncState::Idle
        }
    }

    pub fn metrics(&self) -> SyncMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn last_report(&self) -> Option<SyncReport> {
        self.last_report.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncReport> {
        self.reports.subscribe()
    }

    /// Runs one pass over the current queue. Returns a skipped report when a
    /// pass is already in flight.
    pub async fn sync(&self) -> SyncReport {
        let Some(_guard) = PassGuard::acquire(&self.syncing) else {
            tracing::debug!(target: "sync::manager", "sync already running, trigger ignored");
            return SyncReport::skipped();
        };

        let started = Instant::now();
        let report = self.run_pass().await;
        let duration_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_pass(report.success, duration_ms);
        self.publish(&report, duration_ms).await;
        report
    }

    async fn run_pass(&self) -> SyncReport {
        let items = match self.store.list_queue_items().await {
            Ok(items) => items,
            Err(err) => {
                let err = SyncError::StoreUnavailable(err.to_string());
                tracing::error!(target: "sync::manager", error = %err, "failed to read sync queue");
                return SyncReport::failed(err.to_string());
            }
        };
        if items.is_empty() {
            return SyncReport::completed(0, 0, 0);
        }

        tracing::info!(target: "sync::manager", queued = items.len(), "sync pass started");

        let mut tally = PassTally::default();
        let mut work: VecDeque<(QueueItem, u32)> =
            items.into_iter().map(|item| (item, 1)).collect();

        while let Some((item, attempt)) = work.pop_front() {
            let write = match item.to_write() {
                Ok(write) => write,
                Err(err) if err.is_discardable() => {
                    tracing::warn!(
                        target: "sync::manager",
                        item_id = %item.id,
                        table = %item.table,
                        error = %err,
                        "discarding invalid queue item"
                    );
                    self.evict(&item.id).await;
                    self.metrics.record_discard();
                    tally.discarded += 1;
                    continue;
                }
                Err(err) => {
                    self.dead_letter(&item, &err).await;
                    self.metrics.record_item_failure();
                    tally.failed += 1;
                    continue;
                }
            };

            match self.executor.execute(&write).await {
                Ok(row_id) => {
                    self.evict(&item.id).await;
                    self.mark_mirror(write.table, Some(row_id), SyncStatus::Synced)
                        .await;
                    self.metrics.record_item_success();
                    tally.succeeded += 1;
                }
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    tracing::debug!(
                        target: "sync::manager",
                        item_id = %item.id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying queue item"
                    );
                    tokio::time::sleep(delay).await;
                    work.push_front((item, attempt + 1));
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(
                        target: "sync::manager",
                        item_id = %item.id,
                        table = %item.table,
                        attempts = attempt,
                        error = %err,
                        "retries exhausted, item stays queued"
                    );
                    self.mark_mirror(write.table, write.row_id(), SyncStatus::Error)
                        .await;
                    self.metrics.record_item_failure();
                    tally.failed += 1;
                    tally.parked += 1;
                }
                Err(err) => {
                    self.dead_letter(&item, &err).await;
                    self.mark_mirror(write.table, write.row_id(), SyncStatus::Error)
                        .await;
                    self.metrics.record_item_failure();
                    tally.failed += 1;
                }
            }
        }

        let mut report = SyncReport::completed(tally.succeeded, tally.failed, tally.discarded);
        report.remaining = match self.store.count_queue_items().await {
            Ok(count) => u32::try_from(count).unwrap_or(u32::MAX),
            Err(err) => {
                tracing::warn!(target: "sync::manager", error = %err, "failed to count sync queue");
                tally.parked
            }
        };
        report
    }

    async fn publish(&self, report: &SyncReport, duration_ms: u64) {
        if report.success {
            tracing::info!(
                target: "sync::manager",
                synced = report.success_count,
                discarded = report.discarded_count,
                remaining = report.remaining,
                duration_ms,
                "sync pass completed"
            );
        } else {
            tracing::warn!(
                target: "sync::manager",
                synced = report.success_count,
                failed = report.failure_count,
                remaining = report.remaining,
                error = report.error.as_deref().unwrap_or(""),
                duration_ms,
                "{}",
                report.summary()
            );
        }

        *self.last_report.write().await = Some(report.clone());
        // 購読者がいなくてもエラーにしない
        let _ = self.reports.send(report.clone());
    }

    async fn evict(&self, id: &QueueItemId) {
        if let Err(err) = self.store.remove_queue_item(id).await {
            tracing::error!(
                target: "sync::manager",
                item_id = %id,
                error = %err,
                "failed to remove queue item"
            );
        }
    }

    async fn dead_letter(&self, item: &QueueItem, err: &SyncError) {
        tracing::error!(
            target: "sync::manager",
            item_id = %item.id,
            table = %item.table,
            operation = %item.operation,
            error = %err,
            "moving queue item to dead-letter list"
        );
        let failed = FailedQueueItem::new(item.clone(), err.to_string());
        match self.store.put_failed_item(&failed).await {
            Ok(()) => self.evict(&item.id).await,
            Err(store_err) => tracing::error!(
                target: "sync::manager",
                item_id = %item.id,
                error = %store_err,
                "failed to persist dead-lettered item"
            ),
        }
    }

    async fn mark_mirror(&self, table: SyncTable, id: Option<RowId>, status: SyncStatus) {
        let Some(id) = id else {
            return;
        };
        let result = match self.store.get_record(table, id.as_str()).await {
            Ok(Some(record)) => self.store.put_record(table, &record.with_status(status)).await,
            Ok(None) => Ok(()),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            tracing::warn!(
                target: "sync::manager",
                table = %table,
                row_id = %id,
                error = %err,
                "failed to update mirror status"
            );
        }
    }

    /// Syncs on every offline→online transition, on each tick while online and
    /// after each enqueue while online. Enqueues made during a pass coalesce
    /// into one follow-up pass.
    pub fn spawn_auto_sync(
        self: &Arc<Self>,
        mut connectivity: watch::Receiver<bool>,
        interval: Duration,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            let mut online = *connectivity.borrow_and_update();
            if online {
                manager.sync().await;
            }

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if online {
                            manager.sync().await;
                        }
                    }
                    _ = manager.queued.notified() => {
                        if online {
                            manager.sync().await;
                        }
                    }
                    changed = connectivity.changed() => {
                        if changed.is_err() {
                            tracing::debug!(target: "sync::manager", "connectivity channel closed, auto-sync stopped");
                            break;
                        }
                        let now_online = *connectivity.borrow_and_update();
                        let came_online = now_online && !online;
                        online = now_online;
                        if came_online {
                            tracing::info!(target: "sync::manager", "connection restored, syncing");
                            manager.sync().await;
                        }
                    }
                }
            }
        })
    }
}
