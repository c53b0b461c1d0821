//! Game logic module
//!
//! Everything here is pure and deterministic:
//! - Seeded RNG only
//! - Time enters only through `GameState::tick`
//! - No rendering, storage backends or platform dependencies

pub mod controller;
pub mod error;
pub mod problem;
pub mod state;
pub mod timer;

pub use controller::AnswerOutcome;
pub use error::GameError;
pub use problem::{Difficulty, GameMode, Operation, Problem, generate};
pub use state::{GamePhase, GameSnapshot, GameState, RoundSession};
pub use timer::FeedbackTimer;
