//! Persistence port used by the session controller.
//!
//! The engine never touches disk or network itself; a host injects a
//! [`GameStore`]. [`MemoryStore`] backs tests and `PUZZLE_ENV=test`.

use crate::error::{StoreError, StoreResult};
use crate::stats::GameStats;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// The minimal data needed to resume a puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub puzzle: Value,
    pub state: Value,
}

/// Storage for per-game stats and the in-flight session.
pub trait GameStore: Send + Sync {
    /// Stats for `game`, or defaults when none were saved.
    fn read_stats(&self, game: &str) -> StoreResult<GameStats>;

    fn write_stats(&self, game: &str, stats: &GameStats) -> StoreResult<()>;

    fn read_session(&self, game: &str) -> StoreResult<Option<GameSession>>;

    fn write_session(&self, game: &str, session: &GameSession) -> StoreResult<()>;

    fn clear_session(&self, game: &str) -> StoreResult<()>;

    /// Push any background sync that has come due. `force` pushes everything.
    fn flush(&self, _force: bool) {}

    fn backend_name(&self) -> &'static str;
}

impl<T: GameStore + ?Sized> GameStore for Arc<T> {
    fn read_stats(&self, game: &str) -> StoreResult<GameStats> {
        (**self).read_stats(game)
    }

    fn write_stats(&self, game: &str, stats: &GameStats) -> StoreResult<()> {
        (**self).write_stats(game, stats)
    }

    fn read_session(&self, game: &str) -> StoreResult<Option<GameSession>> {
        (**self).read_session(game)
    }

    fn write_session(&self, game: &str, session: &GameSession) -> StoreResult<()> {
        (**self).write_session(game, session)
    }

    fn clear_session(&self, game: &str) -> StoreResult<()> {
        (**self).clear_session(game)
    }

    fn flush(&self, force: bool) {
        (**self).flush(force)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

#[derive(Debug, Default)]
struct MemoryData {
    stats: HashMap<String, GameStats>,
    sessions: HashMap<String, GameSession>,
}

/// In-memory store. Can be switched to fail every call.
#[derive(Debug)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
    available: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(MemoryData::default()),
            available: Mutex::new(true),
        }
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        *self.available.lock().unwrap_or_else(|e| e.into_inner()) = available;
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> StoreResult<MutexGuard<'_, MemoryData>> {
        if !*self.available.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(self.lock())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore for MemoryStore {
    fn read_stats(&self, game: &str) -> StoreResult<GameStats> {
        Ok(self.check()?.stats.get(game).cloned().unwrap_or_default())
    }

    fn write_stats(&self, game: &str, stats: &GameStats) -> StoreResult<()> {
        self.check()?.stats.insert(game.to_string(), stats.clone());
        Ok(())
    }

    fn read_session(&self, game: &str) -> StoreResult<Option<GameSession>> {
        Ok(self.check()?.sessions.get(game).cloned())
    }

    fn write_session(&self, game: &str, session: &GameSession) -> StoreResult<()> {
        self.check()?.sessions.insert(game.to_string(), session.clone());
        Ok(())
    }

    fn clear_session(&self, game: &str) -> StoreResult<()> {
        self.check()?.sessions.remove(game);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}
