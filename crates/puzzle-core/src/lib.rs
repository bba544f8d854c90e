//! Deterministic puzzle engine.
//!
//! Every family turns a 32-bit seed and a difficulty into a puzzle, folds
//! player actions into new states and evaluates `(puzzle, state)` into a
//! verdict. A [`SessionController`] runs one family for one player on top of
//! an injected [`GameStore`].
//!
//! ```
//! use puzzle_core::{Difficulty, Registry};
//!
//! let registry = Registry::builtin();
//! let sudoku = registry.get("sudoku").unwrap();
//! let a = sudoku.create_puzzle(1, Difficulty::EASY).unwrap();
//! let b = sudoku.create_puzzle(1, Difficulty::EASY).unwrap();
//! assert_eq!(a, b);
//! ```

pub mod clock;
pub mod error;
pub mod games;
pub mod module;
pub mod registry;
pub mod rng;
pub mod session;
pub mod stats;
pub mod store;
pub mod sync;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{EngineError, GenError, StoreError, StoreResult};
pub use module::{
    Action, Category, Difficulty, DynAction, DynGame, Evaluation, GameInfo, GameModule, Hint, Status, Violation,
};
pub use registry::Registry;
pub use rng::Mulberry32;
pub use session::SessionController;
pub use stats::{format_time, GameStats};
pub use store::{GameSession, GameStore, MemoryStore};
pub use sync::{MemoryRemote, MirroredStore, RemoteStore, SyncConfig, SyncQueue};
