#![allow(dead_code)]

use async_trait::async_trait;
use inspection_sync::application::ports::RemoteBackend;
use inspection_sync::application::services::{RetryPolicy, SyncExecutor, SyncManager};
use inspection_sync::domain::entities::offline::PendingWrite;
use inspection_sync::domain::value_objects::offline::{RowId, RowPayload, SyncTable};
use inspection_sync::infrastructure::offline::{MemoryLocalStore, SqliteLocalStore};
use inspection_sync::shared::error::AppError;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub table: SyncTable,
    pub row: Value,
}

/// Backend fake with per-row scripted failures.
///
/// Rows are matched by any string column equal to the marker passed to
/// `reject` / `respond_without_id`.
#[derive(Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<RecordedCall>>,
    rejections: Mutex<HashMap<String, u32>>,
    without_id: Mutex<HashSet<String>>,
    issued_ids: Mutex<VecDeque<String>>,
    remote_rows: Mutex<HashMap<SyncTable, Vec<Value>>>,
    next_id: AtomicU64,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits for a `notify_one` on the returned handle.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (backend, gate)
    }

    pub fn reject(&self, marker: &str, times: u32) {
        self.rejections
            .lock()
            .unwrap()
            .insert(marker.to_string(), times);
    }

    pub fn respond_without_id(&self, marker: &str) {
        self.without_id.lock().unwrap().insert(marker.to_string());
    }

    /// Ids handed out to inserts, in order, before falling back to `row-N`.
    pub fn issue_ids(&self, ids: &[&str]) {
        self.issued_ids
            .lock()
            .unwrap()
            .extend(ids.iter().map(|id| id.to_string()));
    }

    pub fn seed_rows(&self, table: SyncTable, rows: Vec<Value>) {
        self.remote_rows.lock().unwrap().insert(table, rows);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn respond(
        &self,
        method: &'static str,
        table: SyncTable,
        row: &Map<String, Value>,
    ) -> Result<Option<String>, AppError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            table,
            row: Value::Object(row.clone()),
        });

        let markers: Vec<String> = row
            .values()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect();

        {
            let mut rejections = self.rejections.lock().unwrap();
            for marker in &markers {
                if let Some(remaining) = rejections.get_mut(marker) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(AppError::Network(format!(
                            "backend error: 503 Service Unavailable - {marker}"
                        )));
                    }
                }
            }
        }

        let omit_id = {
            let without_id = self.without_id.lock().unwrap();
            markers.iter().any(|marker| without_id.contains(marker))
        };
        if omit_id {
            return Ok(None);
        }

        let id = match row.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => self.issued_ids.lock().unwrap().pop_front().unwrap_or_else(|| {
                format!("row-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
            }),
        };
        Ok(Some(id))
    }
}

#[async_trait]
impl RemoteBackend for ScriptedBackend {
    async fn insert(
        &self,
        table: SyncTable,
        row: &Map<String, Value>,
    ) -> Result<Vec<Value>, AppError> {
        let id = self.respond("insert", table, row).await?;
        Ok(id
            .map(|id| {
                let mut created = row.clone();
                created.insert("id".into(), Value::String(id));
                vec![Value::Object(created)]
            })
            .unwrap_or_default())
    }

    async fn upsert(
        &self,
        table: SyncTable,
        row: &Map<String, Value>,
    ) -> Result<Vec<Value>, AppError> {
        self.respond("upsert", table, row).await?;
        Ok(vec![Value::Object(row.clone())])
    }

    async fn delete_by_id(&self, table: SyncTable, id: &RowId) -> Result<(), AppError> {
        let mut row = Map::new();
        row.insert("id".into(), Value::String(id.to_string()));
        self.respond("delete", table, &row).await?;
        Ok(())
    }

    async fn select_all(&self, table: SyncTable) -> Result<Vec<Value>, AppError> {
        Ok(self
            .remote_rows
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(5))
}

pub async fn sqlite_manager(
    backend: Arc<ScriptedBackend>,
    policy: RetryPolicy,
) -> (SyncManager, Arc<SqliteLocalStore>) {
    let store = Arc::new(SqliteLocalStore::in_memory().await.expect("in-memory sqlite"));
    let manager = SyncManager::new(store.clone(), SyncExecutor::new(backend), policy);
    (manager, store)
}

pub fn memory_manager(
    backend: Arc<ScriptedBackend>,
    policy: RetryPolicy,
) -> (SyncManager, Arc<MemoryLocalStore>) {
    let store = Arc::new(MemoryLocalStore::new());
    let manager = SyncManager::new(store.clone(), SyncExecutor::new(backend), policy);
    (manager, store)
}

pub fn company(name: &str) -> PendingWrite {
    PendingWrite::insert(
        SyncTable::Companies,
        RowPayload::new(json!({ "fantasy_name": name })).expect("payload"),
    )
    .expect("company insert")
}

pub fn inspection(company_id: &str, checklist_id: &str) -> PendingWrite {
    PendingWrite::insert(
        SyncTable::Inspections,
        RowPayload::new(json!({
            "company_id": company_id,
            "checklist_id": checklist_id,
        }))
        .expect("payload"),
    )
    .expect("inspection insert")
}
