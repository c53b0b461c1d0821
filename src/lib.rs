//! Math Adventure - addition and subtraction practice for kids
//!
//! Core modules:
//! - `sim`: Problem generation and the round/game controller
//! - `highscores`: Score records, leaderboard ranking and display helpers
//! - `settings`: Player-tunable game settings with clamped inputs
//! - `persistence`: Key-value store trait and JSON document helpers
//! - `audio`: Best-effort answer feedback sounds
//! - `platform`: Browser/native backends for storage, audio and timers
//! - `web`: JavaScript-facing game handle (wasm32 only)

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use audio::{AnswerSound, AudioNotifier, Clip, ClipBackend};
pub use highscores::{Achievement, ScoreRecord, SortBy, rank};
pub use persistence::{KeyValueStore, MemoryStore, StorageError};
pub use settings::{GameSettings, SettingsField, load_settings, save_settings};
pub use sim::{
    AnswerOutcome, Difficulty, GameError, GameMode, GamePhase, GameState, Operation, Problem,
    RoundSession, generate,
};

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// How long answer feedback stays on screen before the round summary
    pub const FEEDBACK_DELAY: Duration = Duration::from_millis(1000);

    /// Operand range for easy problems
    pub const EASY_MIN: u32 = 1;
    pub const EASY_MAX: u32 = 10;
    /// Operand range for medium problems
    pub const MEDIUM_MIN: u32 = 5;
    pub const MEDIUM_MAX: u32 = 20;
    /// Largest sum a medium addition problem may show
    pub const MEDIUM_SUM_CAP: u32 = 20;

    /// Settings bounds
    pub const MIN_PROBLEMS_PER_ROUND: u32 = 1;
    pub const MAX_PROBLEMS_PER_ROUND: u32 = 20;
    pub const MIN_LIVES: u32 = 1;
    pub const MAX_LIVES: u32 = 10;

    /// Settings defaults
    pub const DEFAULT_PROBLEMS_PER_ROUND: u32 = 5;
    pub const DEFAULT_MAX_LIVES: u32 = 5;

    /// Audio clip locations
    pub const CORRECT_CLIP_PATH: &str = "/sounds/correct.mp3";
    pub const INCORRECT_CLIP_PATH: &str = "/sounds/incorrect.mp3";
}
