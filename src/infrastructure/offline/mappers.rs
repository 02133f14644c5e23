use super::rows::{MirrorRecordRow, QueueItemRow, SyncFailureRow};
use crate::domain::entities::offline::{FailedQueueItem, MirrorRecord, QueueItem};
use crate::domain::value_objects::offline::{
    QueueItemId, RowId, RowPayload, SyncOperation, SyncStatus, SyncTable,
};
use crate::shared::error::{AppError, SyncError};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Corrupt JSON decodes to `null` so the sync pass can dead-letter the entry
/// instead of failing the whole read.
fn parse_data(id: &str, raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        tracing::warn!(
            target: "offline::store",
            item_id = id,
            error = %err,
            "queued payload is not valid JSON"
        );
        Value::Null
    })
}

fn millis_to_datetime(value: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(value)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn queue_item_from_row(row: QueueItemRow) -> Result<QueueItem, AppError> {
    let id = QueueItemId::new(row.id).map_err(AppError::DeserializationError)?;
    let data = parse_data(id.as_str(), &row.data);
    Ok(QueueItem::new(
        id,
        row.table_name,
        SyncOperation::from(row.operation),
        data,
        row.timestamp,
    ))
}

pub fn queue_item_data_to_string(item: &QueueItem) -> Result<String, AppError> {
    Ok(serde_json::to_string(&item.data)?)
}

pub fn mirror_record_from_row(row: MirrorRecordRow) -> Result<MirrorRecord, AppError> {
    let table: SyncTable = row
        .partition_name
        .parse()
        .map_err(|err: SyncError| AppError::DeserializationError(err.to_string()))?;
    let id = RowId::new(row.id).map_err(AppError::DeserializationError)?;
    let value: Value = serde_json::from_str(&row.data)
        .map_err(|err| AppError::DeserializationError(err.to_string()))?;
    let data = RowPayload::new(value).map_err(AppError::DeserializationError)?;

    Ok(MirrorRecord {
        id,
        table,
        data,
        sync_status: SyncStatus::from(row.sync_status),
        updated_at: millis_to_datetime(row.updated_at),
    })
}

pub fn failed_item_from_row(row: SyncFailureRow) -> Result<FailedQueueItem, AppError> {
    let id = QueueItemId::new(row.id).map_err(AppError::DeserializationError)?;
    let data = parse_data(id.as_str(), &row.data);
    Ok(FailedQueueItem {
        item: QueueItem::new(
            id,
            row.table_name,
            SyncOperation::from(row.operation),
            data,
            row.timestamp,
        ),
        error_message: row.error_message,
        failed_at: millis_to_datetime(row.failed_at),
    })
}
