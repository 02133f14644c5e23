use crate::application::ports::local_store::LocalStore;
use crate::domain::entities::offline::{FailedQueueItem, MirrorRecord, QueueItem, RecordIndex};
use crate::domain::value_objects::offline::{QueueItemId, SyncTable};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    records: HashMap<SyncTable, HashMap<String, MirrorRecord>>,
    queue: Vec<QueueItem>,
    failed: BTreeMap<String, FailedQueueItem>,
}

/// Volatile store with the same semantics as the SQLite one. Nothing survives
/// a restart.
#[derive(Clone, Default)]
pub struct MemoryLocalStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn put_record(&self, table: SyncTable, record: &MirrorRecord) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        state
            .records
            .entry(table)
            .or_default()
            .insert(record.id.to_string(), record.clone());
        Ok(())
    }

    async fn get_record(
        &self,
        table: SyncTable,
        id: &str,
    ) -> Result<Option<MirrorRecord>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .records
            .get(&table)
            .and_then(|records| records.get(id))
            .cloned())
    }

    async fn get_all(&self, table: SyncTable) -> Result<Vec<MirrorRecord>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .records
            .get(&table)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_by_index(
        &self,
        table: SyncTable,
        index: RecordIndex,
        value: &str,
    ) -> Result<Vec<MirrorRecord>, AppError> {
        let records = self.get_all(table).await?;
        Ok(records
            .into_iter()
            .filter(|record| match index {
                RecordIndex::SyncStatus => record.sync_status.as_str() == value,
            })
            .collect())
    }

    async fn remove_record(&self, table: SyncTable, id: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        Ok(state
            .records
            .get_mut(&table)
            .and_then(|records| records.remove(id))
            .is_some())
    }

    async fn put_queue_item(&self, item: &QueueItem) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        match state.queue.iter().position(|existing| existing.id == item.id) {
            Some(index) => state.queue[index] = item.clone(),
            None => state.queue.push(item.clone()),
        }
        Ok(())
    }

    async fn list_queue_items(&self) -> Result<Vec<QueueItem>, AppError> {
        Ok(self.state.read().await.queue.clone())
    }

    async fn remove_queue_item(&self, id: &QueueItemId) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.queue.len();
        state.queue.retain(|item| &item.id != id);
        Ok(state.queue.len() != before)
    }

    async fn count_queue_items(&self) -> Result<u64, AppError> {
        Ok(self.state.read().await.queue.len() as u64)
    }

    async fn put_failed_item(&self, item: &FailedQueueItem) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        state
            .failed
            .insert(item.item.id.to_string(), item.clone());
        Ok(())
    }

    async fn list_failed_items(&self) -> Result<Vec<FailedQueueItem>, AppError> {
        let state = self.state.read().await;
        let mut items: Vec<FailedQueueItem> = state.failed.values().cloned().collect();
        items.sort_by_key(|item| item.failed_at);
        Ok(items)
    }

    async fn remove_failed_item(&self, id: &QueueItemId) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        Ok(state.failed.remove(id.as_str()).is_some())
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::offline::{RowId, RowPayload, SyncOperation, SyncStatus};
    use serde_json::json;

    fn item(id: &str, name: &str) -> QueueItem {
        QueueItem::new(
            QueueItemId::new(id.into()).unwrap(),
            "companies".into(),
            SyncOperation::Insert,
            json!({"fantasy_name": name}),
            0,
        )
    }

    #[tokio::test]
    async fn re_put_replaces_in_place() {
        let store = MemoryLocalStore::new();
        store.put_queue_item(&item("a", "first")).await.unwrap();
        store.put_queue_item(&item("b", "second")).await.unwrap();
        store.put_queue_item(&item("a", "renamed")).await.unwrap();

        let queue = store.list_queue_items().await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id.as_str(), "a");
        assert_eq!(queue[0].data, json!({"fantasy_name": "renamed"}));
    }

    #[tokio::test]
    async fn index_lookup_filters_by_status() {
        let store = MemoryLocalStore::new();
        for (id, status) in [("1", SyncStatus::Pending), ("2", SyncStatus::Synced)] {
            let record = MirrorRecord::new(
                RowId::new(id.into()).unwrap(),
                SyncTable::Inspections,
                RowPayload::new(json!({"id": id})).unwrap(),
                status,
            );
            store.put_record(SyncTable::Inspections, &record).await.unwrap();
        }

        let pending = store
            .get_by_index(SyncTable::Inspections, RecordIndex::SyncStatus, "pending")
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id.as_str(), "1");
        assert!(store.get_all(SyncTable::Companies).await.unwrap().is_empty());

        assert!(store.remove_record(SyncTable::Inspections, "1").await.unwrap());
        assert!(!store.remove_record(SyncTable::Inspections, "1").await.unwrap());
        assert!(!store.remove_record(SyncTable::Companies, "2").await.unwrap());
        assert_eq!(store.get_all(SyncTable::Inspections).await.unwrap().len(), 1);
    }
}
