use super::mappers::{
    failed_item_from_row, mirror_record_from_row, queue_item_data_to_string, queue_item_from_row,
};
use super::rows::{MirrorRecordRow, QueueItemRow, SyncFailureRow};
use crate::application::ports::local_store::LocalStore;
use crate::domain::entities::offline::{FailedQueueItem, MirrorRecord, QueueItem, RecordIndex};
use crate::domain::value_objects::offline::{QueueItemId, SyncTable};
use crate::infrastructure::database::ConnectionPool;
use crate::shared::config::StorageConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

/// Latest migration shipped in `migrations/`.
pub const LOCAL_STORE_SCHEMA_VERSION: i64 = 2;

pub struct SqliteLocalStore {
    connection: ConnectionPool,
}

impl SqliteLocalStore {
    /// Opens the store file under the data dir, creating it when missing, and
    /// applies pending migrations. Migrations only add partitions.
    pub async fn open(config: &StorageConfig) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&config.data_dir).await?;
        let path = config.store_path();
        let connection = ConnectionPool::open_file(&path).await?;
        connection.migrate().await?;

        let store = Self { connection };
        let schema_version = store.schema_version().await?;
        tracing::info!(
            target: "offline::store",
            path = %path.display(),
            schema_version,
            "local store opened"
        );
        Ok(store)
    }

    pub async fn in_memory() -> Result<Self, AppError> {
        let connection = ConnectionPool::from_memory().await?;
        connection.migrate().await?;
        Ok(Self { connection })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        self.connection.get_pool()
    }

    pub async fn schema_version(&self) -> Result<i64, AppError> {
        let (version,): (Option<i64>,) =
            sqlx::query_as("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(self.pool())
                .await?;
        Ok(version.unwrap_or(0))
    }

    fn decode_records(rows: Vec<MirrorRecordRow>) -> Vec<MirrorRecord> {
        rows.into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match mirror_record_from_row(row) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        tracing::warn!(
                            target: "offline::store",
                            record_id = %id,
                            error = %err,
                            "skipping unreadable mirror record"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn put_record(&self, table: SyncTable, record: &MirrorRecord) -> Result<(), AppError> {
        let data = serde_json::to_string(record.data.as_map())?;

        sqlx::query(
            r#"
            INSERT INTO mirror_records (partition_name, id, data, sync_status, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(partition_name, id) DO UPDATE SET
                data = excluded.data,
                sync_status = excluded.sync_status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(table.as_str())
        .bind(record.id.as_str())
        .bind(&data)
        .bind(record.sync_status.as_str())
        .bind(record.updated_at.timestamp_millis())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn get_record(
        &self,
        table: SyncTable,
        id: &str,
    ) -> Result<Option<MirrorRecord>, AppError> {
        let row = sqlx::query_as::<_, MirrorRecordRow>(
            r#"
            SELECT partition_name, id, data, sync_status, updated_at
            FROM mirror_records
            WHERE partition_name = ?1 AND id = ?2
            "#,
        )
        .bind(table.as_str())
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(mirror_record_from_row).transpose()
    }

    async fn get_all(&self, table: SyncTable) -> Result<Vec<MirrorRecord>, AppError> {
        let rows = sqlx::query_as::<_, MirrorRecordRow>(
            r#"
            SELECT partition_name, id, data, sync_status, updated_at
            FROM mirror_records
            WHERE partition_name = ?1
            "#,
        )
        .bind(table.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(Self::decode_records(rows))
    }

    async fn get_by_index(
        &self,
        table: SyncTable,
        index: RecordIndex,
        value: &str,
    ) -> Result<Vec<MirrorRecord>, AppError> {
        let rows = match index {
            RecordIndex::SyncStatus => {
                sqlx::query_as::<_, MirrorRecordRow>(
                    r#"
                    SELECT partition_name, id, data, sync_status, updated_at
                    FROM mirror_records
                    WHERE partition_name = ?1 AND sync_status = ?2
                    "#,
                )
                .bind(table.as_str())
                .bind(value)
                .fetch_all(self.pool())
                .await?
            }
        };

        Ok(Self::decode_records(rows))
    }

    async fn remove_record(&self, table: SyncTable, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM mirror_records WHERE partition_name = ?1 AND id = ?2")
            .bind(table.as_str())
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn put_queue_item(&self, item: &QueueItem) -> Result<(), AppError> {
        let data = queue_item_data_to_string(item)?;

        // 既存IDはseqを保持したまま上書き（キュー内の順序は変えない）
        sqlx::query(
            r#"
            INSERT INTO sync_queue (id, table_name, operation, data, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                table_name = excluded.table_name,
                operation = excluded.operation,
                data = excluded.data,
                timestamp = excluded.timestamp
            "#,
        )
        .bind(item.id.as_str())
        .bind(&item.table)
        .bind(item.operation.as_str())
        .bind(&data)
        .bind(item.timestamp)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn list_queue_items(&self) -> Result<Vec<QueueItem>, AppError> {
        let rows = sqlx::query_as::<_, QueueItemRow>(
            r#"
            SELECT seq, id, table_name, operation, data, timestamp
            FROM sync_queue
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(queue_item_from_row).collect()
    }

    async fn remove_queue_item(&self, id: &QueueItemId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sync_queue WHERE id = ?1")
            .bind(id.as_str())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_queue_items(&self) -> Result<u64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sync_queue")
            .fetch_one(self.pool())
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn put_failed_item(&self, failed: &FailedQueueItem) -> Result<(), AppError> {
        let data = queue_item_data_to_string(&failed.item)?;

        sqlx::query(
            r#"
            INSERT INTO sync_failures (
                id, table_name, operation, data, timestamp, error_message, failed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                table_name = excluded.table_name,
                operation = excluded.operation,
                data = excluded.data,
                timestamp = excluded.timestamp,
                error_message = excluded.error_message,
                failed_at = excluded.failed_at
            "#,
        )
        .bind(failed.item.id.as_str())
        .bind(&failed.item.table)
        .bind(failed.item.operation.as_str())
        .bind(&data)
        .bind(failed.item.timestamp)
        .bind(&failed.error_message)
        .bind(failed.failed_at.timestamp_millis())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn list_failed_items(&self) -> Result<Vec<FailedQueueItem>, AppError> {
        let rows = sqlx::query_as::<_, SyncFailureRow>(
            r#"
            SELECT id, table_name, operation, data, timestamp, error_message, failed_at
            FROM sync_failures
            ORDER BY failed_at ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(failed_item_from_row).collect()
    }

    async fn remove_failed_item(&self, id: &QueueItemId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sync_failures WHERE id = ?1")
            .bind(id.as_str())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.connection.close().await;
    }
}
