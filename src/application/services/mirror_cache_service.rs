use crate::application::ports::local_store::LocalStore;
use crate::application::ports::remote_backend::RemoteBackend;
use crate::domain::entities::offline::{MirrorRecord, PendingWrite, RecordIndex, SyncMutation};
use crate::domain::value_objects::offline::{RowId, RowPayload, SyncStatus, SyncTable};
use crate::shared::error::AppError;
use futures::future::join_all;
use std::sync::Arc;

/// Local copies of remote rows for reads while offline.
pub struct MirrorCacheService {
    store: Arc<dyn LocalStore>,
    backend: Arc<dyn RemoteBackend>,
}

impl MirrorCacheService {
    pub fn new(store: Arc<dyn LocalStore>, backend: Arc<dyn RemoteBackend>) -> Self {
        Self { store, backend }
    }

    /// Applies a write to the cached row. Inserts and updates are stored with
    /// `status`, an update merging into what is cached; a delete drops the
    /// row. Inserts without a client id are not cached.
    pub async fn apply_write(
        &self,
        write: &PendingWrite,
        status: SyncStatus,
    ) -> Result<(), AppError> {
        let table = write.table;
        match &write.mutation {
            SyncMutation::Insert { data } => {
                let Some(id) = data.id() else {
                    return Ok(());
                };
                let record = MirrorRecord::new(id, table, data.clone(), status);
                self.store.put_record(table, &record).await
            }
            SyncMutation::Update { id, data } => {
                let merged = match self.store.get_record(table, id.as_str()).await? {
                    Some(mut cached) => {
                        cached.data.merge(data);
                        cached.data
                    }
                    None => data.clone(),
                };
                let record = MirrorRecord::new(id.clone(), table, merged, status);
                self.store.put_record(table, &record).await
            }
            SyncMutation::Delete { id } => {
                self.store.remove_record(table, id.as_str()).await?;
                Ok(())
            }
        }
    }

    /// Overwrites cached rows with a fresh remote read. Rows without an id are
    /// skipped.
    pub async fn refresh(&self, table: SyncTable) -> Result<usize, AppError> {
        let rows = self.backend.select_all(table).await?;
        let mut stored = 0;

        for row in rows {
            let Ok(data) = RowPayload::new(row) else {
                continue;
            };
            let Some(id) = data.id() else {
                continue;
            };
            let record = MirrorRecord::new(id, table, data, SyncStatus::Synced);
            self.store.put_record(table, &record).await?;
            stored += 1;
        }

        tracing::debug!(target: "offline::store", table = %table, rows = stored, "mirror refreshed");
        Ok(stored)
    }

    pub async fn refresh_all(&self) -> Vec<(SyncTable, Result<usize, AppError>)> {
        let results = join_all(SyncTable::ALL.iter().map(|table| self.refresh(*table))).await;
        SyncTable::ALL.iter().copied().zip(results).collect()
    }

    pub async fn list(&self, table: SyncTable) -> Result<Vec<MirrorRecord>, AppError> {
        self.store.get_all(table).await
    }

    pub async fn with_status(
        &self,
        table: SyncTable,
        status: SyncStatus,
    ) -> Result<Vec<MirrorRecord>, AppError> {
        self.store
            .get_by_index(table, RecordIndex::SyncStatus, status.as_str())
            .await
    }

    /// Returns false when the row is not cached.
    pub async fn mark(
        &self,
        table: SyncTable,
        id: &RowId,
        status: SyncStatus,
    ) -> Result<bool, AppError> {
        match self.store.get_record(table, id.as_str()).await? {
            Some(record) => {
                self.store.put_record(table, &record.with_status(status)).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::offline::MemoryLocalStore;
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::{Map, Value, json};

    mock! {
        pub Backend {}

        #[async_trait]
        impl RemoteBackend for Backend {
            async fn insert(&self, table: SyncTable, row: &Map<String, Value>) -> Result<Vec<Value>, AppError>;
            async fn upsert(&self, table: SyncTable, row: &Map<String, Value>) -> Result<Vec<Value>, AppError>;
            async fn delete_by_id(&self, table: SyncTable, id: &RowId) -> Result<(), AppError>;
            async fn select_all(&self, table: SyncTable) -> Result<Vec<Value>, AppError>;
        }
    }

    fn payload(value: Value) -> RowPayload {
        RowPayload::new(value).unwrap()
    }

    #[tokio::test]
    async fn refresh_overwrites_pending_rows_as_synced() {
        let store = Arc::new(MemoryLocalStore::new());
        let mut backend = MockBackend::new();
        backend.expect_select_all().returning(|_| {
            Ok(vec![
                json!({"id": "c1", "fantasy_name": "Acme Ltda"}),
                json!({"fantasy_name": "no id"}),
            ])
        });
        let cache = MirrorCacheService::new(store, Arc::new(backend));

        let insert = PendingWrite::insert(
            SyncTable::Companies,
            payload(json!({"id": "c1", "fantasy_name": "Acme"})),
        )
        .unwrap();
        cache.apply_write(&insert, SyncStatus::Pending).await.unwrap();
        assert_eq!(
            cache
                .with_status(SyncTable::Companies, SyncStatus::Pending)
                .await
                .unwrap()
                .len(),
            1
        );

        assert_eq!(cache.refresh(SyncTable::Companies).await.unwrap(), 1);

        let rows = cache.list(SyncTable::Companies).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sync_status, SyncStatus::Synced);
        assert_eq!(rows[0].data.as_map()["fantasy_name"], "Acme Ltda");
    }

    #[tokio::test]
    async fn insert_without_id_is_not_cached_and_mark_reports_presence() {
        let cache = MirrorCacheService::new(
            Arc::new(MemoryLocalStore::new()),
            Arc::new(MockBackend::new()),
        );

        let insert =
            PendingWrite::insert(SyncTable::Users, payload(json!({"email": "a@b.c"}))).unwrap();
        cache.apply_write(&insert, SyncStatus::Pending).await.unwrap();
        assert!(cache.list(SyncTable::Users).await.unwrap().is_empty());

        let missing = RowId::new("u-404".into()).unwrap();
        assert!(!cache
            .mark(SyncTable::Users, &missing, SyncStatus::Error)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn partial_update_merges_into_cached_row() {
        let store = Arc::new(MemoryLocalStore::new());
        let cache = MirrorCacheService::new(store.clone(), Arc::new(MockBackend::new()));
        let cached = MirrorRecord::new(
            RowId::new("c1".into()).unwrap(),
            SyncTable::Companies,
            payload(json!({"id": "c1", "fantasy_name": "Acme", "cnpj": "123"})),
            SyncStatus::Synced,
        );
        store.put_record(SyncTable::Companies, &cached).await.unwrap();

        let update = PendingWrite::update(
            SyncTable::Companies,
            payload(json!({"id": "c1", "fantasy_name": "Acme Ltda"})),
        )
        .unwrap();
        cache.apply_write(&update, SyncStatus::Pending).await.unwrap();

        let row = store
            .get_record(SyncTable::Companies, "c1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.sync_status, SyncStatus::Pending);
        assert_eq!(
            row.data.to_value(),
            json!({"id": "c1", "fantasy_name": "Acme Ltda", "cnpj": "123"})
        );
    }

    #[tokio::test]
    async fn delete_drops_cached_row() {
        let store = Arc::new(MemoryLocalStore::new());
        let cache = MirrorCacheService::new(store.clone(), Arc::new(MockBackend::new()));
        let id = RowId::new("chk-1".into()).unwrap();
        let cached = MirrorRecord::new(
            id.clone(),
            SyncTable::Checklists,
            payload(json!({"id": "chk-1", "title": "NR-10"})),
            SyncStatus::Synced,
        );
        store.put_record(SyncTable::Checklists, &cached).await.unwrap();

        let delete = PendingWrite::delete(SyncTable::Checklists, id.clone());
        cache.apply_write(&delete, SyncStatus::Pending).await.unwrap();

        assert!(store
            .get_record(SyncTable::Checklists, "chk-1")
            .await
            .unwrap()
            .is_none());
        assert!(!cache
            .mark(SyncTable::Checklists, &id, SyncStatus::Synced)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn refresh_all_reports_per_table() {
        let mut backend = MockBackend::new();
        backend.expect_select_all().returning(|table| match table {
            SyncTable::Users => Err(AppError::Network("offline".into())),
            _ => Ok(vec![]),
        });
        let cache =
            MirrorCacheService::new(Arc::new(MemoryLocalStore::new()), Arc::new(backend));

        let results = cache.refresh_all().await;
        assert_eq!(results.len(), SyncTable::ALL.len());
        for (table, result) in results {
            assert_eq!(result.is_err(), table == SyncTable::Users);
        }
    }
}
