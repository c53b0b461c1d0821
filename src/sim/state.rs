//! Game state and session types
//!
//! The controller operations that mutate this state live in `controller`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::problem::{Difficulty, GameMode, Problem, generate};
use super::timer::FeedbackTimer;
use crate::settings::GameSettings;

/// Current screen of the game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum GamePhase {
    /// Start screen, waiting for a difficulty
    SelectingDifficulty,
    /// Difficulty chosen, waiting for a mode
    SelectingMode { difficulty: Difficulty },
    /// Answering problems (including the feedback delay after the last one)
    InRound,
    /// Between rounds; `ended` means lives ran out and only reset remains
    RoundSummary { ended: bool },
}

/// Progress of one game, owned by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSession {
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub current_problem: Problem,
    /// Index of the current problem within the round (0-based)
    pub problem_index: u32,
    /// Correct answers across all rounds of this game
    pub correct_count: u32,
    /// Answers given across all rounds of this game
    pub total_count: u32,
    pub lives_remaining: u32,
    pub ended: bool,
}

impl RoundSession {
    pub(crate) fn new(difficulty: Difficulty, mode: GameMode, first: Problem, lives: u32) -> Self {
        Self {
            difficulty,
            mode,
            current_problem: first,
            problem_index: 0,
            correct_count: 0,
            total_count: 0,
            lives_remaining: lives,
            ended: false,
        }
    }
}

/// Transition applied when the feedback timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingSummary {
    pub ended: bool,
}

/// Serializable view of the controller for front ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub session: Option<RoundSession>,
    pub settings: GameSettings,
    /// A round-end transition is waiting on the feedback timer
    pub awaiting_summary: bool,
}

/// Complete controller state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG started from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) phase: GamePhase,
    pub(crate) session: Option<RoundSession>,
    pub(crate) settings: GameSettings,
    pub(crate) timer: FeedbackTimer<PendingSummary>,
}

impl GameState {
    /// Create a controller on the start screen
    pub fn new(settings: GameSettings, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::SelectingDifficulty,
            session: None,
            settings: settings.clamped(),
            timer: FeedbackTimer::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn session(&self) -> Option<&RoundSession> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn current_problem(&self) -> Option<Problem> {
        match self.phase {
            GamePhase::InRound => self.session.as_ref().map(|s| s.current_problem),
            _ => None,
        }
    }

    /// True while a round-end transition waits on the feedback delay
    pub fn awaiting_summary(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            session: self.session.clone(),
            settings: self.settings,
            awaiting_summary: self.awaiting_summary(),
        }
    }

    /// Draw the next problem for the session's difficulty and mode
    pub(crate) fn next_problem(&mut self, difficulty: Difficulty, mode: GameMode) -> Problem {
        generate(difficulty, mode, &mut self.rng)
    }
}
