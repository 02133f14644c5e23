use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_STORE_NAME: &str = "inspection-offline.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub store_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
    pub max_retry: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                url: "http://localhost:54321".to_string(),
                api_key: String::new(),
                request_timeout: 30,
            },
            storage: StorageConfig {
                data_dir: default_data_dir(),
                store_name: DEFAULT_STORE_NAME.to_string(),
            },
            sync: SyncConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync: true,
            sync_interval: 300, // 5 minutes
            max_retry: 3,
            retry_base_delay_ms: 1_000,
        }
    }
}

impl StorageConfig {
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.store_name)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("INSPECTION_BACKEND_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.backend.url = trimmed.trim_end_matches('/').to_string();
            }
        }
        if let Ok(v) = std::env::var("INSPECTION_BACKEND_API_KEY") {
            cfg.backend.api_key = v.trim().to_string();
        }
        if let Some(value) = env_u64("INSPECTION_BACKEND_TIMEOUT_SECS") {
            cfg.backend.request_timeout = value.max(1);
        }

        if let Ok(v) = std::env::var("INSPECTION_DATA_DIR") {
            if !v.trim().is_empty() {
                cfg.storage.data_dir = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("INSPECTION_STORE_NAME") {
            if !v.trim().is_empty() {
                cfg.storage.store_name = v.trim().to_string();
            }
        }

        if let Ok(v) = std::env::var("INSPECTION_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Some(value) = env_u64("INSPECTION_SYNC_INTERVAL_SECS") {
            cfg.sync.sync_interval = value;
        }
        if let Some(value) = std::env::var("INSPECTION_SYNC_MAX_RETRY")
            .ok()
            .and_then(|v| parse_u32(&v))
        {
            cfg.sync.max_retry = value;
        }
        if let Some(value) = env_u64("INSPECTION_SYNC_RETRY_BASE_MS") {
            cfg.sync.retry_base_delay_ms = value;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = self.backend.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err("Backend url must start with http:// or https://".to_string());
        }
        if self.backend.request_timeout == 0 {
            return Err("Backend request_timeout must be greater than 0".to_string());
        }
        if self.storage.store_name.trim().is_empty() {
            return Err("Storage store_name must not be empty".to_string());
        }
        if self.sync.max_retry == 0 {
            return Err("Sync max_retry must be greater than 0".to_string());
        }
        if self.sync.auto_sync && self.sync.sync_interval == 0 {
            return Err("Sync sync_interval must be greater than 0 when auto_sync is on".to_string());
        }
        Ok(())
    }
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("inspection-sync"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .into_owned()
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| parse_u64(&v))
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
