//! Best-effort mirroring of a local store to a remote one.
//!
//! Writes land in the local store first and are authoritative. Each write also
//! schedules a push of the same record under a player-scoped key; pushes are
//! debounced per key and their failures are logged and dropped.

use crate::clock::Clock;
use crate::error::StoreResult;
use crate::stats::GameStats;
use crate::store::{GameSession, GameStore};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Remote side of the mirror, addressed by opaque keys.
pub trait RemoteStore: Send + Sync {
    fn pull(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Store `payload` under `key`. A `null` payload deletes.
    fn push(&self, key: &str, payload: &Value) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period after the last write to a key before it is pushed.
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { debounce_ms: 1500 }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::milliseconds(self.debounce_ms as i64)
    }
}

#[derive(Debug, Clone)]
struct Pending {
    payload: Value,
    due: DateTime<Utc>,
}

/// Outbound queue holding at most one payload per key.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    debounce: Duration,
    pending: BTreeMap<String, Pending>,
}

impl SyncQueue {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            debounce: config.debounce(),
            pending: BTreeMap::new(),
        }
    }

    /// Queue `payload` for `key`, replacing any earlier payload and restarting its delay.
    pub fn schedule(&mut self, key: impl Into<String>, payload: Value, now: DateTime<Utc>) {
        self.pending.insert(
            key.into(),
            Pending {
                payload,
                due: now + self.debounce,
            },
        );
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Push every entry due at `now`. Returns how many pushes succeeded.
    pub fn flush_due(&mut self, remote: &dyn RemoteStore, now: DateTime<Utc>) -> usize {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= now)
            .map(|(k, _)| k.clone())
            .collect();
        self.push_keys(remote, due)
    }

    /// Push everything regardless of delay.
    pub fn flush_all(&mut self, remote: &dyn RemoteStore) -> usize {
        let keys: Vec<String> = self.pending.keys().cloned().collect();
        self.push_keys(remote, keys)
    }

    fn push_keys(&mut self, remote: &dyn RemoteStore, keys: Vec<String>) -> usize {
        let mut pushed = 0;
        for key in keys {
            let Some(entry) = self.pending.remove(&key) else {
                continue;
            };
            match remote.push(&key, &entry.payload) {
                Ok(()) => pushed += 1,
                Err(err) => tracing::debug!(%key, %err, backend = remote.backend_name(), "dropping failed sync"),
            }
        }
        pushed
    }
}

/// A local store mirrored to a remote one.
///
/// Reads prefer the remote copy and write it back into the local store, unless
/// a local change for the same key is still waiting to be pushed.
pub struct MirroredStore<L, R> {
    local: L,
    remote: R,
    player: String,
    clock: Arc<dyn Clock>,
    queue: Mutex<SyncQueue>,
}

impl<L: GameStore, R: RemoteStore> MirroredStore<L, R> {
    pub fn new(local: L, remote: R, player: impl Into<String>, clock: Arc<dyn Clock>, config: SyncConfig) -> Self {
        Self {
            local,
            remote,
            player: player.into(),
            clock,
            queue: Mutex::new(SyncQueue::new(config)),
        }
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    fn queue(&self) -> MutexGuard<'_, SyncQueue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key(&self, game: &str, kind: &str) -> String {
        format!("{}/{}/{}", self.player, game, kind)
    }

    fn schedule(&self, key: String, payload: Value) {
        self.queue().schedule(key, payload, self.clock.now());
    }

    /// Remote record for `key`, unless unreachable or shadowed by a pending
    /// local write. `null` marks a deleted record.
    fn fetch(&self, key: &str) -> Option<Value> {
        if self.queue().is_pending(key) {
            return None;
        }
        match self.remote.pull(key) {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!(%key, %err, "remote read failed, using local copy");
                None
            }
        }
    }
}

fn parse<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(%key, %err, "ignoring malformed remote record");
            None
        }
    }
}

impl<L: GameStore, R: RemoteStore> GameStore for MirroredStore<L, R> {
    fn read_stats(&self, game: &str) -> StoreResult<GameStats> {
        let key = self.key(game, "stats");
        if let Some(stats) = self.fetch(&key).and_then(|v| parse::<GameStats>(&key, v)) {
            self.local.write_stats(game, &stats)?;
            return Ok(stats);
        }
        self.local.read_stats(game)
    }

    fn write_stats(&self, game: &str, stats: &GameStats) -> StoreResult<()> {
        self.local.write_stats(game, stats)?;
        self.schedule(self.key(game, "stats"), serde_json::to_value(stats)?);
        Ok(())
    }

    fn read_session(&self, game: &str) -> StoreResult<Option<GameSession>> {
        let key = self.key(game, "session");
        match self.fetch(&key) {
            Some(Value::Null) => {
                self.local.clear_session(game)?;
                Ok(None)
            }
            Some(value) => match parse::<GameSession>(&key, value) {
                Some(session) => {
                    self.local.write_session(game, &session)?;
                    Ok(Some(session))
                }
                None => self.local.read_session(game),
            },
            None => self.local.read_session(game),
        }
    }

    fn write_session(&self, game: &str, session: &GameSession) -> StoreResult<()> {
        self.local.write_session(game, session)?;
        self.schedule(self.key(game, "session"), serde_json::to_value(session)?);
        Ok(())
    }

    fn clear_session(&self, game: &str) -> StoreResult<()> {
        self.local.clear_session(game)?;
        self.schedule(self.key(game, "session"), Value::Null);
        Ok(())
    }

    fn flush(&self, force: bool) {
        let mut queue = self.queue();
        if force {
            queue.flush_all(&self.remote);
        } else {
            queue.flush_due(&self.remote, self.clock.now());
        }
    }

    fn backend_name(&self) -> &'static str {
        "Mirrored"
    }
}

/// In-memory remote for tests.
#[derive(Debug)]
pub struct MemoryRemote {
    records: Mutex<BTreeMap<String, Value>>,
    available: Mutex<bool>,
    pushes: Mutex<usize>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            available: Mutex::new(true),
            pushes: Mutex::new(0),
        }
    }

    pub fn set_available(&self, available: bool) {
        *self.available.lock().unwrap_or_else(|e| e.into_inner()) = available;
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }

    /// Number of successful pushes so far.
    pub fn push_count(&self) -> usize {
        *self.pushes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> StoreResult<()> {
        if *self.available.lock().unwrap_or_else(|e| e.into_inner()) {
            Ok(())
        } else {
            Err(crate::error::StoreError::Unavailable("memory remote switched off".into()))
        }
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryRemote {
    fn pull(&self, key: &str) -> StoreResult<Option<Value>> {
        self.check()?;
        Ok(self.get(key))
    }

    fn push(&self, key: &str, payload: &Value) -> StoreResult<()> {
        self.check()?;
        self.insert(key, payload.clone());
        *self.pushes.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "MemoryRemote"
    }
}

impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    fn pull(&self, key: &str) -> StoreResult<Option<Value>> {
        (**self).pull(key)
    }

    fn push(&self, key: &str, payload: &Value) -> StoreResult<()> {
        (**self).push(key, payload)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
