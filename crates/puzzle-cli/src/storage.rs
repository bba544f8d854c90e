//! Storage backends for the terminal host
//!
//! Selected by environment:
//! - Local: one JSON file per game and record kind under the data directory
//! - Test: in-memory store, nothing touches disk
//! - Production: local files mirrored to a sync directory in the background

use anyhow::{Context, Result};
use puzzle_core::{
    Clock, GameSession, GameStats, GameStore, MemoryStore, MirroredStore, RemoteStore, StoreError, StoreResult,
    SyncConfig,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Files under the data directory
    Local,
    /// In-memory store
    Test,
    /// Local files plus a mirrored sync directory
    Production,
}

impl Environment {
    /// Parse a `PUZZLE_ENV` value. Anything unrecognised is `Local`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "production" | "prod" => Environment::Production,
            "test" | "testing" => Environment::Test,
            _ => Environment::Local,
        }
    }
}

/// Where the host keeps its data
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub env: Environment,
    pub data_dir: PathBuf,
    pub sync_dir: Option<PathBuf>,
    pub player: String,
}

impl StorageConfig {
    /// Default data directory, `<data_local_dir>/puzzles`.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("puzzles")
    }
}

/// Build the store for `config.env`.
pub fn create_store(config: &StorageConfig, clock: Arc<dyn Clock>) -> Result<Arc<dyn GameStore>> {
    let store: Arc<dyn GameStore> = match config.env {
        Environment::Test => Arc::new(MemoryStore::new()),
        Environment::Local => Arc::new(FileStore::new(&config.data_dir)),
        Environment::Production => {
            let sync_dir = config
                .sync_dir
                .as_ref()
                .context("PUZZLE_SYNC_DIR must be set in production")?;
            Arc::new(MirroredStore::new(
                FileStore::new(&config.data_dir),
                DirectoryRemote::new(sync_dir),
                config.player.clone(),
                clock,
                SyncConfig::default(),
            ))
        }
    };
    tracing::debug!(backend = store.backend_name(), env = ?config.env, "storage ready");
    Ok(store)
}

// ==================== Local File Backend ====================

/// One JSON file per game and kind: `<game>.stats.json`, `<game>.session.json`.
pub struct FileStore {
    root: PathBuf,
    cache: Mutex<HashMap<PathBuf, Value>>,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn path(&self, game: &str, kind: &str) -> PathBuf {
        self.root.join(format!("{game}.{kind}.json"))
    }

    /// Cached file contents, `Null` when the file is missing or unreadable.
    fn load(&self, path: &Path) -> StoreResult<Value> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(value) = cache.get(path) {
            return Ok(value.clone());
        }
        let value = match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "ignoring corrupt file");
                Value::Null
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Value::Null,
            Err(err) => return Err(err.into()),
        };
        cache.insert(path.to_path_buf(), value.clone());
        Ok(value)
    }

    fn save<T: Serialize>(&self, path: PathBuf, record: &T) -> StoreResult<()> {
        let value = serde_json::to_value(record)?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).insert(path, value);
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, path: &Path) -> StoreResult<Option<T>> {
        match self.load(path)? {
            Value::Null => Ok(None),
            value => Ok(serde_json::from_value(value).ok()),
        }
    }
}

impl GameStore for FileStore {
    fn read_stats(&self, game: &str) -> StoreResult<GameStats> {
        Ok(self.read(&self.path(game, "stats"))?.unwrap_or_default())
    }

    fn write_stats(&self, game: &str, stats: &GameStats) -> StoreResult<()> {
        self.save(self.path(game, "stats"), stats)
    }

    fn read_session(&self, game: &str) -> StoreResult<Option<GameSession>> {
        self.read(&self.path(game, "session"))
    }

    fn write_session(&self, game: &str, session: &GameSession) -> StoreResult<()> {
        self.save(self.path(game, "session"), session)
    }

    fn clear_session(&self, game: &str) -> StoreResult<()> {
        let path = self.path(game, "session");
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).insert(path, Value::Null);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Local"
    }
}

// ==================== Mirror Directory Backend ====================

/// Remote port backed by a second directory, one file per key.
pub struct DirectoryRemote {
    root: PathBuf,
}

impl DirectoryRemote {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for part in key.split('/').filter(|p| !p.is_empty() && *p != "..") {
            path.push(part);
        }
        path.set_extension("json");
        path
    }
}

impl RemoteStore for DirectoryRemote {
    fn pull(&self, key: &str) -> StoreResult<Option<Value>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Unavailable(err.to_string())),
        }
    }

    fn push(&self, key: &str, payload: &Value) -> StoreResult<()> {
        let path = self.path(key);
        if payload.is_null() {
            return match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(StoreError::Unavailable(err.to_string())),
            };
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(payload)?)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "Directory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use puzzle_core::ManualClock;
    use serde_json::json;

    fn session() -> GameSession {
        GameSession {
            puzzle: json!({ "seed": 42, "difficulty": 1 }),
            state: json!({ "path": ["S"] }),
        }
    }

    #[test]
    fn test_environment_names() {
        assert_eq!(Environment::from_name("prod"), Environment::Production);
        assert_eq!(Environment::from_name("testing"), Environment::Test);
        assert_eq!(Environment::from_name("anything"), Environment::Local);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.read_stats("routes").unwrap(), GameStats::default());
        assert!(store.read_session("routes").unwrap().is_none());

        let stats = GameStats {
            attempts: 3,
            solves: 1,
            ..GameStats::default()
        };
        store.write_stats("routes", &stats).unwrap();
        store.write_session("routes", &session()).unwrap();
        assert!(dir.path().join("routes.stats.json").exists());

        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.read_stats("routes").unwrap(), stats);
        assert_eq!(reopened.read_session("routes").unwrap(), Some(session()));

        reopened.clear_session("routes").unwrap();
        assert!(reopened.read_session("routes").unwrap().is_none());
        assert!(!dir.path().join("routes.session.json").exists());
        reopened.clear_session("routes").unwrap();
    }

    #[test]
    fn test_file_store_ignores_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sudoku.stats.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("sudoku.session.json"), "[1, 2]").unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.read_stats("sudoku").unwrap(), GameStats::default());
        assert!(store.read_session("sudoku").unwrap().is_none());
    }

    #[test]
    fn test_directory_remote_push_pull_delete() {
        let dir = tempfile::tempdir().unwrap();
        let remote = DirectoryRemote::new(dir.path());
        assert!(remote.pull("alice/routes/session").unwrap().is_none());

        remote.push("alice/routes/session", &json!({ "a": 1 })).unwrap();
        assert!(dir.path().join("alice/routes/session.json").exists());
        assert_eq!(remote.pull("alice/routes/session").unwrap(), Some(json!({ "a": 1 })));

        remote.push("alice/routes/session", &Value::Null).unwrap();
        assert!(remote.pull("alice/routes/session").unwrap().is_none());
    }

    #[test]
    fn test_create_store_per_environment() {
        let dir = tempfile::tempdir().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()));
        let mut config = StorageConfig {
            env: Environment::Test,
            data_dir: dir.path().join("data"),
            sync_dir: None,
            player: "alice".into(),
        };
        assert_eq!(create_store(&config, clock.clone()).unwrap().backend_name(), "Memory");

        config.env = Environment::Local;
        assert_eq!(create_store(&config, clock.clone()).unwrap().backend_name(), "Local");

        config.env = Environment::Production;
        assert!(create_store(&config, clock.clone()).is_err());

        config.sync_dir = Some(dir.path().join("sync"));
        let store = create_store(&config, clock).unwrap();
        store.write_session("routes", &session()).unwrap();
        store.flush(true);
        assert!(dir.path().join("data/routes.session.json").exists());
        assert!(dir.path().join("sync/alice/routes/session.json").exists());
    }
}
