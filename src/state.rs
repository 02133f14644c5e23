use crate::application::ports::{LocalStore, RemoteBackend, SessionProvider};
use crate::application::services::{MirrorCacheService, RetryPolicy, SyncExecutor, SyncManager};
use crate::domain::entities::offline::{PendingWrite, QueueItem, SyncReport};
use crate::domain::value_objects::offline::{RowId, SyncOperation, SyncStatus};
use crate::infrastructure::backend::RestBackend;
use crate::infrastructure::offline::SqliteLocalStore;
use crate::shared::config::AppConfig;
use crate::shared::error::{AppError, SyncError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// Result of [`AppState::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Written to the backend right away.
    Applied(RowId),
    /// Stored in the queue for the next sync pass.
    Queued(QueueItem),
}

/// Store-backed components. Absent when the local store could not be opened.
pub struct OfflineComponents {
    pub store: Arc<dyn LocalStore>,
    pub sync_manager: Arc<SyncManager>,
    pub mirror_cache: Arc<MirrorCacheService>,
}

/// アプリケーション全体の状態を管理する構造体
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn RemoteBackend>,
    pub executor: SyncExecutor,
    pub offline: Option<Arc<OfflineComponents>>,
    connectivity: Arc<watch::Sender<bool>>,
    auto_sync: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AppState {
    pub async fn new(
        config: AppConfig,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let backend: Arc<dyn RemoteBackend> = Arc::new(RestBackend::new(&config.backend, session)?);

        let store: Option<Arc<dyn LocalStore>> = match SqliteLocalStore::open(&config.storage).await
        {
            Ok(store) => Some(Arc::new(store)),
            Err(err) => {
                let err = SyncError::StoreUnavailable(err.to_string());
                tracing::error!(
                    target: "app::state",
                    error = %err,
                    path = %config.storage.store_path().display(),
                    "running without offline support"
                );
                None
            }
        };

        Ok(Self::from_parts(config, backend, store))
    }

    /// Wires the components around an already-built backend and store.
    pub fn from_parts(
        config: AppConfig,
        backend: Arc<dyn RemoteBackend>,
        store: Option<Arc<dyn LocalStore>>,
    ) -> Self {
        let executor = SyncExecutor::new(Arc::clone(&backend));
        let offline = store.map(|store| {
            let sync_manager = Arc::new(SyncManager::new(
                Arc::clone(&store),
                executor.clone(),
                RetryPolicy::from_config(&config.sync),
            ));
            let mirror_cache = Arc::new(MirrorCacheService::new(
                Arc::clone(&store),
                Arc::clone(&backend),
            ));
            Arc::new(OfflineComponents {
                store,
                sync_manager,
                mirror_cache,
            })
        });
        let (connectivity, _) = watch::channel(true);

        Self {
            config: Arc::new(config),
            backend,
            executor,
            offline,
            connectivity: Arc::new(connectivity),
            auto_sync: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.offline.is_none()
    }

    pub fn sync_manager(&self) -> Option<Arc<SyncManager>> {
        self.offline
            .as_ref()
            .map(|offline| Arc::clone(&offline.sync_manager))
    }

    pub fn mirror_cache(&self) -> Option<Arc<MirrorCacheService>> {
        self.offline
            .as_ref()
            .map(|offline| Arc::clone(&offline.mirror_cache))
    }

    pub fn is_online(&self) -> bool {
        *self.connectivity.borrow()
    }

    pub fn set_online(&self, online: bool) {
        let previous = self.connectivity.send_replace(online);
        if previous != online {
            tracing::info!(target: "app::state", online, "connectivity changed");
        }
    }

    /// Writes remotely when online, otherwise queues the write. A retryable
    /// remote failure also falls back to the queue.
    pub async fn submit(&self, write: PendingWrite) -> Result<WriteOutcome, AppError> {
        let Some(offline) = &self.offline else {
            let id = self.executor.execute(&write).await?;
            return Ok(WriteOutcome::Applied(id));
        };

        if self.is_online() {
            match self.executor.execute(&write).await {
                Ok(id) => {
                    let cached = match write.operation() {
                        SyncOperation::Insert => offline
                            .mirror_cache
                            .mark(write.table, &id, SyncStatus::Synced)
                            .await
                            .map(|_| ()),
                        _ => {
                            offline
                                .mirror_cache
                                .apply_write(&write, SyncStatus::Synced)
                                .await
                        }
                    };
                    if let Err(err) = cached {
                        tracing::warn!(target: "app::state", error = %err, "failed to update mirror status");
                    }
                    return Ok(WriteOutcome::Applied(id));
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(
                        target: "app::state",
                        table = %write.table,
                        error = %err,
                        "remote write failed, queueing"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        if let Err(err) = offline
            .mirror_cache
            .apply_write(&write, SyncStatus::Pending)
            .await
        {
            tracing::warn!(target: "app::state", error = %err, "failed to cache local write");
        }
        let item = offline.sync_manager.enqueue(&write).await?;
        Ok(WriteOutcome::Queued(item))
    }

    pub async fn sync_now(&self) -> SyncReport {
        match &self.offline {
            Some(offline) => offline.sync_manager.sync().await,
            None => SyncReport::failed(
                SyncError::StoreUnavailable("local store is not open".to_string()).to_string(),
            ),
        }
    }

    /// Starts the background sync task. Returns false when auto-sync is
    /// disabled or there is no store.
    pub async fn start_auto_sync(&self) -> bool {
        let Some(offline) = &self.offline else {
            return false;
        };
        if !self.config.sync.auto_sync {
            return false;
        }

        let mut slot = self.auto_sync.lock().await;
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return true;
        }
        let interval = Duration::from_secs(self.config.sync.sync_interval);
        *slot = Some(
            offline
                .sync_manager
                .spawn_auto_sync(self.connectivity.subscribe(), interval),
        );
        tracing::info!(
            target: "app::state",
            interval_secs = self.config.sync.sync_interval,
            "auto-sync started"
        );
        true
    }

    pub async fn dispose(&self) {
        if let Some(handle) = self.auto_sync.lock().await.take() {
            handle.abort();
        }
        if let Some(offline) = &self.offline {
            offline.store.close().await;
        }
        tracing::info!(target: "app::state", "app state disposed");
    }
}
