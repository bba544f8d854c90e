//! The contract every puzzle family implements.
//!
//! A family is a [`GameModule`]: it turns `(seed, difficulty)` into an
//! immutable puzzle, produces an initial mutable state, folds actions into new
//! states and projects `(puzzle, state)` onto an [`Evaluation`]. The session
//! controller only ever sees the type-erased [`DynGame`] view.

use crate::error::EngineError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Difficulty level, always within `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const EASY: Difficulty = Difficulty(1);
    pub const MEDIUM: Difficulty = Difficulty(2);
    pub const HARD: Difficulty = Difficulty(3);

    /// Clamp an arbitrary level into range.
    pub fn new(level: u8) -> Self {
        Self(level.clamp(1, 3))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Pick the entry for this level from a three-element table.
    pub fn select<T: Copy>(self, table: [T; 3]) -> T {
        table[(self.0 - 1) as usize]
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::EASY
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad grouping used for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Grid,
    Graph,
    Arithmetic,
    Verbal,
}

/// Identity and display metadata for a family.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub difficulty_labels: [&'static str; 3],
}

/// Where a puzzle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    InProgress,
    Solved,
    Failed,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::InProgress)
    }
}

/// One rule the current state breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Violation {
    pub fn new(kind: &str, message: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            message: message.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Verdict for a `(puzzle, state)` pair. Recomputed on every change, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub status: Status,
    pub errors: Vec<Violation>,
    pub score_delta: i32,
}

impl Evaluation {
    pub fn in_progress(errors: Vec<Violation>) -> Self {
        Self {
            status: Status::InProgress,
            errors,
            score_delta: 0,
        }
    }

    pub fn solved(score_delta: i32) -> Self {
        Self {
            status: Status::Solved,
            errors: Vec::new(),
            score_delta,
        }
    }

    pub fn failed(errors: Vec<Violation>, score_delta: i32) -> Self {
        Self {
            status: Status::Failed,
            errors,
            score_delta,
        }
    }
}

/// A nudge toward the solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Hint {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// A family action, or the universal replacement used by the session controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<A, S> {
    Play(A),
    Reset(S),
}

/// A puzzle family.
pub trait GameModule: Send + Sync {
    type Puzzle: Clone + Serialize + DeserializeOwned;
    type State: Clone + PartialEq + Serialize + DeserializeOwned;
    type Action: Clone + Serialize + DeserializeOwned;

    fn info(&self) -> &GameInfo;

    /// Deterministic in `(seed, difficulty)`.
    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> Self::Puzzle;

    fn initial_state(&self, puzzle: &Self::Puzzle) -> Self::State;

    /// Total: impossible moves return the state unchanged.
    fn reduce(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    fn evaluate(&self, puzzle: &Self::Puzzle, state: &Self::State) -> Evaluation;

    fn hint(&self, _puzzle: &Self::Puzzle, _state: &Self::State) -> Option<Hint> {
        None
    }

    fn dispatch(&self, state: &Self::State, action: Action<Self::Action, Self::State>) -> Self::State {
        match action {
            Action::Reset(next) => next,
            Action::Play(action) => self.reduce(state, &action),
        }
    }
}

/// Action as seen by the type-erased layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DynAction {
    Play(Value),
    Reset(Value),
}

/// Object-safe view of a [`GameModule`] over JSON values.
pub trait DynGame: Send + Sync {
    fn info(&self) -> &GameInfo;
    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> Result<Value, EngineError>;
    fn initial_state(&self, puzzle: &Value) -> Result<Value, EngineError>;
    fn dispatch(&self, state: &Value, action: DynAction) -> Result<Value, EngineError>;
    fn evaluate(&self, puzzle: &Value, state: &Value) -> Result<Evaluation, EngineError>;
    fn hint(&self, puzzle: &Value, state: &Value) -> Result<Option<Hint>, EngineError>;
}

impl<M: GameModule> DynGame for M {
    fn info(&self) -> &GameInfo {
        GameModule::info(self)
    }

    fn create_puzzle(&self, seed: u32, difficulty: Difficulty) -> Result<Value, EngineError> {
        let puzzle = GameModule::create_puzzle(self, seed, difficulty);
        encode(self, "puzzle", &puzzle)
    }

    fn initial_state(&self, puzzle: &Value) -> Result<Value, EngineError> {
        let puzzle: M::Puzzle = decode(self, "puzzle", puzzle)?;
        encode(self, "state", &GameModule::initial_state(self, &puzzle))
    }

    fn dispatch(&self, state: &Value, action: DynAction) -> Result<Value, EngineError> {
        // A reset replaces whatever was there, so the current state is only
        // decoded for family actions.
        match action {
            DynAction::Reset(next) => match serde_json::from_value::<M::State>(next) {
                Ok(next) => encode(self, "state", &next),
                Err(err) => {
                    tracing::debug!(game = GameModule::info(self).id, %err, "ignoring reset with malformed state");
                    Ok(state.clone())
                }
            },
            DynAction::Play(raw) => {
                let current: M::State = decode(self, "state", state)?;
                match serde_json::from_value::<M::Action>(raw) {
                    Ok(action) => encode(self, "state", &GameModule::dispatch(self, &current, Action::Play(action))),
                    Err(err) => {
                        tracing::debug!(game = GameModule::info(self).id, %err, "ignoring unknown action");
                        Ok(state.clone())
                    }
                }
            }
        }
    }

    fn evaluate(&self, puzzle: &Value, state: &Value) -> Result<Evaluation, EngineError> {
        let puzzle: M::Puzzle = decode(self, "puzzle", puzzle)?;
        let state: M::State = decode(self, "state", state)?;
        Ok(GameModule::evaluate(self, &puzzle, &state))
    }

    fn hint(&self, puzzle: &Value, state: &Value) -> Result<Option<Hint>, EngineError> {
        let puzzle: M::Puzzle = decode(self, "puzzle", puzzle)?;
        let state: M::State = decode(self, "state", state)?;
        Ok(GameModule::hint(self, &puzzle, &state))
    }
}

fn encode<M: GameModule, T: Serialize>(
    module: &M,
    what: &'static str,
    value: &T,
) -> Result<Value, EngineError> {
    serde_json::to_value(value).map_err(|source| EngineError::Snapshot {
        game: GameModule::info(module).id,
        what,
        source,
    })
}

fn decode<M: GameModule, T: DeserializeOwned>(
    module: &M,
    what: &'static str,
    value: &Value,
) -> Result<T, EngineError> {
    T::deserialize(value).map_err(|source| EngineError::Snapshot {
        game: GameModule::info(module).id,
        what,
        source,
    })
}
