//! # hoover-config
//!
//! Layered configuration for the hoover4 pipeline.
//!
//! Loads configuration from:
//! 1. Compile-time defaults (`Config::default()`)
//! 2. `~/.hoover4/config.toml` (global)
//! 3. `<dataset_path>/.hoover4/config.toml` (project-local, overrides global)
//! 4. `HOOVER4_*` environment variables (highest priority)

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

use hoover_types::SMALL_BLOB_THRESHOLD_BYTES;

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| {
    RwLock::new(Config::load().unwrap_or_else(|e| {
        eprintln!(
            "[hoover-config] WARNING: Failed to load config: {}. Using defaults.",
            e
        );
        Config::default()
    }))
});

/// Get the global config (read-only).
pub fn config() -> std::sync::RwLockReadGuard<'static, Config> {
    CONFIG.read().unwrap()
}

/// Reload config from disk, replacing the global instance.
pub fn reload() -> Result<(), ConfigError> {
    let new_config = Config::load()?;
    *CONFIG.write().unwrap() = new_config;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub config_version: u32,
    pub storage: StorageConfig,
    pub ingest: IngestConfig,
    pub workers: WorkerConfig,
    pub ai: AiSidecarConfig,
    pub daemon: DaemonConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            storage: StorageConfig::default(),
            ingest: IngestConfig::default(),
            workers: WorkerConfig::default(),
            ai: AiSidecarConfig::default(),
            daemon: DaemonConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub object_store: ObjectStoreConfig,
    pub search_engine: SearchEngineConfig,
    pub small_blob_threshold_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            clickhouse_url: "http://localhost:8123".to_string(),
            clickhouse_database: "hoover4".to_string(),
            object_store: ObjectStoreConfig::default(),
            search_engine: SearchEngineConfig::default(),
            small_blob_threshold_bytes: SMALL_BLOB_THRESHOLD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            bucket: "hoover4-blobs".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            region: "us-east-1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchEngineConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9306,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub scratch_base_dir: PathBuf,
    pub max_recursion_depth: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            scratch_base_dir: std::env::temp_dir().join("hoover4"),
            max_recursion_depth: 100,
        }
    }
}

/// Worker-pool concurrency, matching the original `run_worker.py` constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub common_concurrency: usize,
    pub tika_concurrency: usize,
    pub easyocr_concurrency: usize,
    pub indexing_concurrency: usize,
    pub worker_count_common: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            common_concurrency: 8,
            tika_concurrency: 8,
            easyocr_concurrency: 4,
            indexing_concurrency: 1,
            worker_count_common: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSidecarConfig {
    pub ner_url: String,
    pub tika_url: String,
}

impl Default for AiSidecarConfig {
    fn default() -> Self {
        Self {
            ner_url: "http://127.0.0.1:8008/extract-entities".to_string(),
            tika_url: "http://127.0.0.1:9998".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/tmp/hoover4.sock"),
        }
    }
}

impl Config {
    /// Load config from standard locations, project root = current directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_for_project(Path::new("."))
    }

    /// Resolution order: defaults -> global -> project -> env vars.
    pub fn load_for_project(project_root: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                debug!("Loading global config from {:?}", global_path);
                let contents = std::fs::read_to_string(&global_path)?;
                config = toml::from_str(&contents)?;
            }
        }

        let project_config_path = project_root.join(".hoover4/config.toml");
        if project_config_path.exists() {
            debug!("Loading project config from {:?}", project_config_path);
            let contents = std::fs::read_to_string(&project_config_path)?;
            let project_config: Config = toml::from_str(&contents)?;
            config.merge(project_config);
        }

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".hoover4/config.toml"))
    }

    /// Non-default values from `other` replace values in `self`.
    fn merge(&mut self, other: Config) {
        let default_storage = StorageConfig::default();
        if other.storage.clickhouse_url != default_storage.clickhouse_url {
            self.storage.clickhouse_url = other.storage.clickhouse_url;
        }
        if other.storage.clickhouse_database != default_storage.clickhouse_database {
            self.storage.clickhouse_database = other.storage.clickhouse_database;
        }
        if other.storage.small_blob_threshold_bytes != default_storage.small_blob_threshold_bytes {
            self.storage.small_blob_threshold_bytes = other.storage.small_blob_threshold_bytes;
        }
        let default_object_store = ObjectStoreConfig::default();
        if other.storage.object_store.endpoint != default_object_store.endpoint {
            self.storage.object_store.endpoint = other.storage.object_store.endpoint;
        }
        if other.storage.object_store.bucket != default_object_store.bucket {
            self.storage.object_store.bucket = other.storage.object_store.bucket;
        }
        if other.storage.object_store.access_key_id != default_object_store.access_key_id {
            self.storage.object_store.access_key_id = other.storage.object_store.access_key_id;
        }
        if other.storage.object_store.secret_access_key != default_object_store.secret_access_key
        {
            self.storage.object_store.secret_access_key =
                other.storage.object_store.secret_access_key;
        }

        let default_search = SearchEngineConfig::default();
        if other.storage.search_engine.host != default_search.host {
            self.storage.search_engine.host = other.storage.search_engine.host;
        }
        if other.storage.search_engine.port != default_search.port {
            self.storage.search_engine.port = other.storage.search_engine.port;
        }

        let default_ingest = IngestConfig::default();
        if other.ingest.scratch_base_dir != default_ingest.scratch_base_dir {
            self.ingest.scratch_base_dir = other.ingest.scratch_base_dir;
        }
        if other.ingest.max_recursion_depth != default_ingest.max_recursion_depth {
            self.ingest.max_recursion_depth = other.ingest.max_recursion_depth;
        }

        let default_workers = WorkerConfig::default();
        if other.workers.common_concurrency != default_workers.common_concurrency {
            self.workers.common_concurrency = other.workers.common_concurrency;
        }
        if other.workers.tika_concurrency != default_workers.tika_concurrency {
            self.workers.tika_concurrency = other.workers.tika_concurrency;
        }
        if other.workers.easyocr_concurrency != default_workers.easyocr_concurrency {
            self.workers.easyocr_concurrency = other.workers.easyocr_concurrency;
        }
        if other.workers.indexing_concurrency != default_workers.indexing_concurrency {
            self.workers.indexing_concurrency = other.workers.indexing_concurrency;
        }

        let default_ai = AiSidecarConfig::default();
        if other.ai.ner_url != default_ai.ner_url {
            self.ai.ner_url = other.ai.ner_url;
        }
        if other.ai.tika_url != default_ai.tika_url {
            self.ai.tika_url = other.ai.tika_url;
        }

        let default_daemon = DaemonConfig::default();
        if other.daemon.socket_path != default_daemon.socket_path {
            self.daemon.socket_path = other.daemon.socket_path;
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("HOOVER4_CLICKHOUSE_URL") {
            self.storage.clickhouse_url = url;
        }
        if let Ok(db) = std::env::var("HOOVER4_CLICKHOUSE_DATABASE") {
            self.storage.clickhouse_database = db;
        }
        if let Ok(endpoint) = std::env::var("HOOVER4_OBJECT_STORE_ENDPOINT") {
            self.storage.object_store.endpoint = endpoint;
        }
        if let Ok(bucket) = std::env::var("HOOVER4_OBJECT_STORE_BUCKET") {
            self.storage.object_store.bucket = bucket;
        }
        if let Ok(key) = std::env::var("HOOVER4_OBJECT_STORE_ACCESS_KEY_ID") {
            self.storage.object_store.access_key_id = key;
        }
        if let Ok(secret) = std::env::var("HOOVER4_OBJECT_STORE_SECRET_ACCESS_KEY") {
            self.storage.object_store.secret_access_key = secret;
        }
        if let Ok(host) = std::env::var("HOOVER4_SEARCH_ENGINE_HOST") {
            self.storage.search_engine.host = host;
        }
        if let Ok(port) = std::env::var("HOOVER4_SEARCH_ENGINE_PORT") {
            if let Ok(p) = port.parse() {
                self.storage.search_engine.port = p;
            }
        }
        if let Ok(dir) = std::env::var("HOOVER4_SCRATCH_DIR") {
            self.ingest.scratch_base_dir = PathBuf::from(dir);
        }
        if let Ok(ner) = std::env::var("HOOVER4_NER_URL") {
            self.ai.ner_url = ner;
        }
        if let Ok(tika) = std::env::var("HOOVER4_TIKA_URL") {
            self.ai.tika_url = tika;
        }
        if let Ok(socket) = std::env::var("HOOVER4_SOCKET_PATH") {
            self.daemon.socket_path = PathBuf::from(socket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn defaults_carry_the_threshold_from_hoover_types() {
        let cfg = Config::default();
        assert_eq!(
            cfg.storage.small_blob_threshold_bytes,
            SMALL_BLOB_THRESHOLD_BYTES
        );
    }

    #[test]
    fn project_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let hoover_dir = dir.path().join(".hoover4");
        std::fs::create_dir_all(&hoover_dir).unwrap();
        let mut f = std::fs::File::create(hoover_dir.join("config.toml")).unwrap();
        writeln!(f, "[storage]\nclickhouse_url = \"http://ch.internal:8123\"").unwrap();

        let cfg = Config::load_for_project(dir.path()).unwrap();
        assert_eq!(cfg.storage.clickhouse_url, "http://ch.internal:8123");
        assert_eq!(cfg.storage.clickhouse_database, "hoover4");
    }

    #[test]
    fn env_override_beats_project_file() {
        let dir = tempdir().unwrap();
        let hoover_dir = dir.path().join(".hoover4");
        std::fs::create_dir_all(&hoover_dir).unwrap();
        let mut f = std::fs::File::create(hoover_dir.join("config.toml")).unwrap();
        writeln!(f, "[storage]\nclickhouse_url = \"http://from-file:8123\"").unwrap();

        std::env::set_var("HOOVER4_CLICKHOUSE_URL", "http://from-env:8123");
        let cfg = Config::load_for_project(dir.path()).unwrap();
        std::env::remove_var("HOOVER4_CLICKHOUSE_URL");
        assert_eq!(cfg.storage.clickhouse_url, "http://from-env:8123");
    }
}
