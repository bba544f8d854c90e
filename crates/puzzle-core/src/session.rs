//! Session controller: drives one game for one player.
//!
//! Lifecycle:
//! 1. `open` resumes a persisted `{puzzle, state}` or starts a fresh attempt.
//! 2. `dispatch` reduces an action, persists the snapshot and re-evaluates.
//! 3. `tick` advances the elapsed-seconds timer while the puzzle is in progress.
//! 4. The first transition to `solved`/`failed` updates stats and clears the
//!    snapshot. The puzzle is then spent: it can still be played with but is
//!    neither persisted nor counted again.
//! 5. `start_new_puzzle` mints a new seed and counts an attempt;
//!    `reset_puzzle` rebuilds the initial state of the same puzzle.

use crate::clock::Clock;
use crate::error::{EngineError, StoreError};
use crate::module::{Difficulty, DynAction, DynGame, Evaluation, GameInfo, Hint, Status};
use crate::registry::Registry;
use crate::stats::GameStats;
use crate::store::{GameSession, GameStore};
use serde_json::Value;
use std::sync::Arc;

pub struct SessionController {
    game: Arc<dyn DynGame>,
    store: Arc<dyn GameStore>,
    clock: Arc<dyn Clock>,
    difficulty: Difficulty,
    puzzle: Value,
    state: Value,
    evaluation: Evaluation,
    stats: GameStats,
    elapsed: u64,
    timer_running: bool,
    spent: bool,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("game", &self.game.info().id)
            .field("store", &self.store.backend_name())
            .field("difficulty", &self.difficulty)
            .field("status", &self.evaluation.status)
            .field("elapsed", &self.elapsed)
            .field("spent", &self.spent)
            .finish()
    }
}

impl SessionController {
    /// Resume the persisted session for `game_id`, or start a fresh attempt at
    /// `difficulty`.
    pub fn open(
        registry: &Registry,
        game_id: &str,
        store: Arc<dyn GameStore>,
        clock: Arc<dyn Clock>,
        difficulty: Difficulty,
    ) -> Result<Self, EngineError> {
        let mut controller = Self::connect(registry, game_id, store, clock, difficulty)?;
        if controller.resume_saved() {
            return Ok(controller);
        }
        let seed = controller.clock.seed();
        controller.start(seed, difficulty)?;
        Ok(controller)
    }

    /// Resume the persisted session for `game_id` without starting anything.
    /// `None` when there is no live session to resume.
    pub fn resume(
        registry: &Registry,
        game_id: &str,
        store: Arc<dyn GameStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Option<Self>, EngineError> {
        let mut controller = Self::connect(registry, game_id, store, clock, Difficulty::default())?;
        let resumed = controller.resume_saved();
        Ok(resumed.then_some(controller))
    }

    /// Abandon any persisted session and start `(seed, difficulty)` as a new attempt.
    pub fn open_fresh(
        registry: &Registry,
        game_id: &str,
        store: Arc<dyn GameStore>,
        clock: Arc<dyn Clock>,
        seed: u32,
        difficulty: Difficulty,
    ) -> Result<Self, EngineError> {
        let mut controller = Self::connect(registry, game_id, store, clock, difficulty)?;
        controller.clear_snapshot();
        controller.start(seed, difficulty)?;
        Ok(controller)
    }

    fn connect(
        registry: &Registry,
        game_id: &str,
        store: Arc<dyn GameStore>,
        clock: Arc<dyn Clock>,
        difficulty: Difficulty,
    ) -> Result<Self, EngineError> {
        let game = registry.require(game_id)?;
        let stats = absorb(game_id, "read stats", store.read_stats(game_id)).unwrap_or_default();
        Ok(Self {
            game,
            store,
            clock,
            difficulty,
            puzzle: Value::Null,
            state: Value::Null,
            evaluation: Evaluation::in_progress(Vec::new()),
            stats,
            elapsed: 0,
            timer_running: false,
            spent: false,
        })
    }

    /// Load and adopt the saved snapshot, dropping it if unusable.
    fn resume_saved(&mut self) -> bool {
        let id = self.game.info().id;
        let Some(session) = absorb(id, "read session", self.store.read_session(id)).flatten() else {
            return false;
        };
        if self.hydrate(session) {
            tracing::info!(game = id, difficulty = %self.difficulty, "resumed session");
            return true;
        }
        self.clear_snapshot();
        false
    }

    /// Adopt a persisted snapshot. `false` if it does not decode or is already over.
    fn hydrate(&mut self, session: GameSession) -> bool {
        let id = self.game.info().id;
        let evaluation = match self.game.evaluate(&session.puzzle, &session.state) {
            Ok(evaluation) => evaluation,
            Err(err) => {
                tracing::warn!(game = id, %err, "discarding unreadable session");
                return false;
            }
        };
        if evaluation.status.is_terminal() {
            tracing::info!(game = id, "discarding finished session");
            return false;
        }
        if let Some(level) = session.puzzle.get("difficulty").and_then(Value::as_u64) {
            self.difficulty = Difficulty::new(level.min(u8::MAX as u64) as u8);
        }
        self.puzzle = session.puzzle;
        self.state = session.state;
        self.evaluation = evaluation;
        self.restart_timer();
        true
    }

    /// Build a fresh puzzle, count the attempt and force-replace the state.
    fn start(&mut self, seed: u32, difficulty: Difficulty) -> Result<(), EngineError> {
        let puzzle = self.game.create_puzzle(seed, difficulty)?;
        let initial = self.game.initial_state(&puzzle)?;
        self.difficulty = difficulty;
        self.puzzle = puzzle;
        self.spent = false;
        self.stats.record_attempt(self.clock.now());
        self.save_stats();
        self.restart_timer();
        tracing::info!(game = self.game.info().id, seed, difficulty = %difficulty, "started puzzle");
        self.apply(DynAction::Reset(initial))?;
        Ok(())
    }

    /// Start a new puzzle seeded from the clock. Keeps the current difficulty
    /// unless one is given.
    pub fn start_new_puzzle(&mut self, difficulty: Option<Difficulty>) -> Result<&Evaluation, EngineError> {
        let seed = self.clock.seed();
        self.start_new_puzzle_with_seed(seed, difficulty.unwrap_or(self.difficulty))
    }

    pub fn start_new_puzzle_with_seed(&mut self, seed: u32, difficulty: Difficulty) -> Result<&Evaluation, EngineError> {
        self.start(seed, difficulty)?;
        Ok(&self.evaluation)
    }

    /// Back to the initial state of the same puzzle. Not a new attempt.
    pub fn reset_puzzle(&mut self) -> Result<&Evaluation, EngineError> {
        let initial = self.game.initial_state(&self.puzzle)?;
        self.restart_timer();
        self.apply(DynAction::Reset(initial))?;
        Ok(&self.evaluation)
    }

    /// Apply a family action given as JSON. Unknown actions leave the state as is.
    pub fn dispatch(&mut self, action: Value) -> Result<&Evaluation, EngineError> {
        self.apply(DynAction::Play(action))?;
        Ok(&self.evaluation)
    }

    fn apply(&mut self, action: DynAction) -> Result<(), EngineError> {
        let before = self.evaluation.status;
        self.state = self.game.dispatch(&self.state, action)?;
        self.evaluation = self.game.evaluate(&self.puzzle, &self.state)?;
        if self.spent {
            return Ok(());
        }
        if self.evaluation.status.is_terminal() {
            if !before.is_terminal() || self.timer_running {
                self.finish();
            }
        } else {
            self.save_snapshot();
        }
        Ok(())
    }

    /// First terminal transition: stop the clock, update stats, drop the snapshot.
    fn finish(&mut self) {
        self.timer_running = false;
        self.spent = true;
        let now = self.clock.now();
        match self.evaluation.status {
            Status::Solved => self.stats.record_solve(self.clock.today(), self.elapsed, now),
            _ => self.stats.record_failure(now),
        }
        tracing::info!(
            game = self.game.info().id,
            status = ?self.evaluation.status,
            elapsed = self.elapsed,
            streak = self.stats.streak_days,
            "puzzle finished"
        );
        self.save_stats();
        self.clear_snapshot();
    }

    /// One second of wall time passed. Returns whether the timer counted it.
    pub fn tick(&mut self) -> bool {
        self.store.flush(false);
        if self.timer_running && self.evaluation.status == Status::InProgress {
            self.elapsed += 1;
            true
        } else {
            false
        }
    }

    fn restart_timer(&mut self) {
        self.elapsed = 0;
        self.timer_running = true;
    }

    pub fn hint(&self) -> Result<Option<Hint>, EngineError> {
        self.game.hint(&self.puzzle, &self.state)
    }

    fn save_stats(&self) {
        let id = self.game.info().id;
        absorb(id, "write stats", self.store.write_stats(id, &self.stats));
    }

    fn save_snapshot(&self) {
        let id = self.game.info().id;
        let session = GameSession {
            puzzle: self.puzzle.clone(),
            state: self.state.clone(),
        };
        absorb(id, "write session", self.store.write_session(id, &session));
    }

    fn clear_snapshot(&self) {
        let id = self.game.info().id;
        absorb(id, "clear session", self.store.clear_session(id));
    }

    /// Push everything the store still holds back.
    pub fn close(&self) {
        self.store.flush(true);
    }

    pub fn info(&self) -> &GameInfo {
        self.game.info()
    }

    pub fn puzzle(&self) -> &Value {
        &self.puzzle
    }

    pub fn state(&self) -> &Value {
        &self.state
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn seed(&self) -> Option<u32> {
        self.puzzle.get("seed").and_then(Value::as_u64).map(|s| s as u32)
    }

    /// Whether the puzzle already reached a terminal status.
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }
}

/// Log and swallow a store failure.
fn absorb<T>(game: &str, op: &str, result: Result<T, StoreError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(game, op, %err, "store call failed");
            None
        }
    }
}
