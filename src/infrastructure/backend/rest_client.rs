use crate::application::ports::remote_backend::RemoteBackend;
use crate::application::ports::session::SessionProvider;
use crate::domain::value_objects::offline::{RowId, SyncTable};
use crate::shared::config::BackendConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// PostgREST-style client for the hosted backend (`/rest/v1/{table}`).
#[derive(Clone)]
pub struct RestBackend {
    base_url: String,
    api_key: Option<String>,
    session: Arc<dyn SessionProvider>,
    http: reqwest::Client,
}

impl RestBackend {
    pub fn new(config: &BackendConfig, session: Arc<dyn SessionProvider>) -> Result<Self, AppError> {
        let trimmed = config.url.trim();
        if trimmed.is_empty() {
            return Err(AppError::ConfigurationError(
                "Backend url is empty".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout.max(1)))
            .build()?;

        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
            api_key: Some(config.api_key.trim().to_string()).filter(|key| !key.is_empty()),
            session,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: Method, table: SyncTable) -> reqwest::RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table.as_str());
        let mut builder = self.http.request(method, url);

        if let Some(key) = &self.api_key {
            builder = builder.header("apikey", key);
        }
        let token = match self.session.access_token().await {
            Some(token) => Some(token),
            None => self.api_key.clone(),
        };
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder
    }

    async fn write_rows(
        &self,
        table: SyncTable,
        row: &Map<String, Value>,
        prefer: &str,
    ) -> Result<Vec<Value>, AppError> {
        let resp = self
            .request(Method::POST, table)
            .await
            .header("Prefer", prefer)
            .json(row)
            .send()
            .await?;
        read_rows(resp).await
    }
}

#[async_trait]
impl RemoteBackend for RestBackend {
    async fn insert(
        &self,
        table: SyncTable,
        row: &Map<String, Value>,
    ) -> Result<Vec<Value>, AppError> {
        self.write_rows(table, row, "return=representation").await
    }

    async fn upsert(
        &self,
        table: SyncTable,
        row: &Map<String, Value>,
    ) -> Result<Vec<Value>, AppError> {
        self.write_rows(table, row, "return=representation,resolution=merge-duplicates")
            .await
    }

    async fn delete_by_id(&self, table: SyncTable, id: &RowId) -> Result<(), AppError> {
        let filter = format!("eq.{}", id.as_str());
        let resp = self
            .request(Method::DELETE, table)
            .await
            .query(&[("id", filter.as_str())])
            .send()
            .await?;
        ensure_success(resp).await
    }

    async fn select_all(&self, table: SyncTable) -> Result<Vec<Value>, AppError> {
        let resp = self
            .request(Method::GET, table)
            .await
            .query(&[("select", "*")])
            .send()
            .await?;
        read_rows(resp).await
    }
}

async fn read_rows(resp: reqwest::Response) -> Result<Vec<Value>, AppError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !is_success(status) {
        return Err(backend_error(status, &body));
    }
    parse_rows(&body)
}

async fn ensure_success(resp: reqwest::Response) -> Result<(), AppError> {
    let status = resp.status();
    if is_success(status) {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(backend_error(status, &body))
}

fn is_success(status: StatusCode) -> bool {
    status.is_success()
}

fn backend_error(status: StatusCode, body: &str) -> AppError {
    tracing::warn!(target: "backend::rest", status = %status, body, "backend request failed");
    let message = format!("backend error: {status} - {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => AppError::Network(message),
        // 行そのものが拒否された（重複キー、制約違反など）
        _ if status.is_client_error() => AppError::ValidationError(message),
        _ => AppError::Network(message),
    }
}

/// Accepts an array of rows, a single row object, or an empty body.
fn parse_rows(body: &str) -> Result<Vec<Value>, AppError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(body)
        .map_err(|err| AppError::DeserializationError(err.to_string()))?
    {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row @ Value::Object(_) => Ok(vec![row]),
        other => Err(AppError::DeserializationError(format!(
            "unexpected backend response: {other}"
        ))),
    }
}
