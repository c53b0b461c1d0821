//! Round and game progression
//!
//! Every user action is one method on `GameState`. The only time-driven
//! transition is the feedback delay after a round's last answer, which
//! the caller advances with `tick`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use super::error::{GameError, Result};
use super::problem::{Difficulty, GameMode};
use super::state::{GamePhase, GameState, PendingSummary, RoundSession};
use crate::audio::AnswerSound;
use crate::consts::FEEDBACK_DELAY;
use crate::highscores::{self, ScoreRecord};
use crate::persistence::KeyValueStore;
use crate::settings::GameSettings;

/// Messages shown after a correct answer
const PRAISE: &[&str] = &[
    "Excellent! 🌟",
    "Super work! ⭐",
    "Bravo! 🎉",
    "Fantastic! 🌈",
    "You're a mathematician! 🧮",
    "Woohooo! 🚀",
    "Clever clogs! 🧠",
    "Math genius! 💫",
    "Incredible! 🌠",
    "Master of sums! 🏆",
    "Math is your BFF! 🤗",
    "Einstein would be proud! 👨‍🔬",
    "Numbers are your friends! 🔢",
    "Math ninja! 🥷",
    "Sums tremble before you! 💪",
];

/// Result of submitting one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answer: i64,
    pub lives_remaining: u32,
    /// The round summary follows once the feedback delay passes
    pub round_finished: bool,
    /// Lives ran out; the summary will be final
    pub game_over: bool,
}

impl AnswerOutcome {
    /// Feedback line for the player
    pub fn message<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        if self.is_correct {
            PRAISE.choose(rng).copied().unwrap_or("Correct!").to_string()
        } else {
            format!("Not quite. The correct answer is {}", self.correct_answer)
        }
    }
}

impl GameState {
    /// Choose a difficulty on the start screen
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        match self.phase {
            GamePhase::SelectingDifficulty | GamePhase::SelectingMode { .. } => {
                self.phase = GamePhase::SelectingMode { difficulty };
                Ok(())
            }
            _ => Err(GameError::NotSelecting),
        }
    }

    /// Begin a new game with full lives and the first problem
    pub fn start_game(&mut self, difficulty: Difficulty, mode: GameMode) -> Result<()> {
        match self.phase {
            GamePhase::SelectingDifficulty | GamePhase::SelectingMode { .. } => {}
            _ => return Err(GameError::NotSelecting),
        }

        self.timer.cancel();
        let first = self.next_problem(difficulty, mode);
        self.session = Some(RoundSession::new(
            difficulty,
            mode,
            first,
            self.settings.max_lives,
        ));
        self.phase = GamePhase::InRound;
        log::info!(
            "Game started: {} {} ({} problems/round, {} lives)",
            difficulty.as_str(),
            mode.as_str(),
            self.settings.problems_per_round,
            self.settings.max_lives
        );
        Ok(())
    }

    /// Check an answer to the current problem and advance the round
    pub fn submit_answer(&mut self, value: i64, sound: &dyn AnswerSound) -> Result<AnswerOutcome> {
        if self.phase != GamePhase::InRound {
            return Err(GameError::NotInRound);
        }
        if self.timer.is_armed() {
            return Err(GameError::AwaitingSummary);
        }
        let settings = self.settings;
        let session = self.session.as_mut().ok_or(GameError::NotInRound)?;

        let problem = session.current_problem;
        let is_correct = problem.is_correct(value);
        if !is_correct {
            session.lives_remaining = session.lives_remaining.saturating_sub(1);
        }
        session.total_count += 1;
        if is_correct {
            session.correct_count += 1;
        }

        if settings.sound_enabled {
            sound.notify(is_correct);
        }

        // `>=` so a round shortened in settings mid-round still ends
        let is_last_problem = session.problem_index + 1 >= settings.problems_per_round;
        let game_over = !is_correct && session.lives_remaining == 0;

        let outcome = AnswerOutcome {
            is_correct,
            correct_answer: problem.answer(),
            lives_remaining: session.lives_remaining,
            round_finished: is_last_problem || game_over,
            game_over,
        };
        log::debug!(
            "{} = {} ({}), lives {}",
            problem,
            value,
            if is_correct { "correct" } else { "wrong" },
            outcome.lives_remaining
        );

        if outcome.round_finished {
            self.timer
                .arm(FEEDBACK_DELAY, PendingSummary { ended: game_over });
        } else {
            let (difficulty, mode) = (session.difficulty, session.mode);
            let next = self.next_problem(difficulty, mode);
            if let Some(session) = self.session.as_mut() {
                session.problem_index += 1;
                session.current_problem = next;
            }
        }

        Ok(outcome)
    }

    /// Advance the feedback timer. Returns true if the round summary was entered.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let Some(pending) = self.timer.advance(elapsed) else {
            return false;
        };

        if let Some(session) = self.session.as_mut() {
            session.ended = pending.ended;
            log::info!(
                "Round over: {}/{} correct, {} lives left{}",
                session.correct_count,
                session.total_count,
                session.lives_remaining,
                if pending.ended { ", game over" } else { "" }
            );
        }
        self.phase = GamePhase::RoundSummary {
            ended: pending.ended,
        };
        true
    }

    /// Start another round of the same game; counters and lives carry over
    pub fn continue_round(&mut self) -> Result<()> {
        match self.phase {
            GamePhase::RoundSummary { ended: false } => {}
            GamePhase::RoundSummary { ended: true } => return Err(GameError::AlreadyEnded),
            _ => return Err(GameError::NoRoundSummary),
        }
        let session = self.session.as_ref().ok_or(GameError::NoSession)?;
        let (difficulty, mode) = (session.difficulty, session.mode);

        let next = self.next_problem(difficulty, mode);
        if let Some(session) = self.session.as_mut() {
            session.problem_index = 0;
            session.current_problem = next;
        }
        self.phase = GamePhase::InRound;
        Ok(())
    }

    /// Drop the session and return to the start screen with fresh scores
    pub fn reset_game<S: KeyValueStore + ?Sized>(&mut self, store: &S) -> Vec<ScoreRecord> {
        if self.timer.cancel().is_some() {
            log::debug!("Pending round summary cancelled by reset");
        }
        self.session = None;
        self.phase = GamePhase::SelectingDifficulty;
        highscores::load_scores(store)
    }

    /// Build a score record for the current game; only from the round summary
    pub fn score_record(&self, name: &str, now: DateTime<Utc>) -> Result<ScoreRecord> {
        if !matches!(self.phase, GamePhase::RoundSummary { .. }) {
            return Err(GameError::NoRoundSummary);
        }
        let session = self.session.as_ref().ok_or(GameError::NoSession)?;
        ScoreRecord::new(name, session.correct_count, session.total_count, now)
            .ok_or(GameError::EmptyName)
    }

    /// Replace the settings used from now on; lives only reset with a new game
    pub fn update_settings(&mut self, settings: GameSettings) {
        self.settings = settings.clamped();
    }

    /// Feedback line for an answer, drawn from the game's RNG
    pub fn feedback_message(&mut self, outcome: &AnswerOutcome) -> String {
        outcome.message(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Silent;
    use crate::persistence::MemoryStore;
    use std::cell::RefCell;

    /// Records every notification
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<bool>>,
    }

    impl AnswerSound for Recorder {
        fn notify(&self, is_correct: bool) {
            self.calls.borrow_mut().push(is_correct);
        }
    }

    fn settings(problems_per_round: u32, max_lives: u32) -> GameSettings {
        GameSettings {
            problems_per_round,
            max_lives,
            sound_enabled: true,
        }
    }

    fn started(problems_per_round: u32, max_lives: u32) -> GameState {
        let mut state = GameState::new(settings(problems_per_round, max_lives), 12345);
        state.start_game(Difficulty::Easy, GameMode::Mixed).unwrap();
        state
    }

    fn answer_right(state: &mut GameState) -> AnswerOutcome {
        let problem = state.current_problem().unwrap();
        state.submit_answer(problem.answer(), &Silent).unwrap()
    }

    fn answer_wrong(state: &mut GameState) -> AnswerOutcome {
        let problem = state.current_problem().unwrap();
        state.submit_answer(problem.answer() + 1, &Silent).unwrap()
    }

    #[test]
    fn test_selection_flow() {
        let mut state = GameState::new(GameSettings::default(), 1);
        assert_eq!(state.phase(), GamePhase::SelectingDifficulty);

        state.select_difficulty(Difficulty::Medium).unwrap();
        assert_eq!(
            state.phase(),
            GamePhase::SelectingMode {
                difficulty: Difficulty::Medium
            }
        );

        state
            .start_game(Difficulty::Medium, GameMode::Subtraction)
            .unwrap();
        assert_eq!(state.phase(), GamePhase::InRound);
        assert_eq!(
            state.select_difficulty(Difficulty::Easy),
            Err(GameError::NotSelecting)
        );
    }

    #[test]
    fn test_start_game_initializes_session() {
        let state = started(5, 3);
        let session = state.session().unwrap();
        assert_eq!(session.problem_index, 0);
        assert_eq!(session.correct_count, 0);
        assert_eq!(session.total_count, 0);
        assert_eq!(session.lives_remaining, 3);
        assert!(!session.ended);
        assert!(state.current_problem().is_some());
    }

    #[test]
    fn test_correct_and_incorrect_answers() {
        let mut state = started(5, 3);

        let outcome = answer_right(&mut state);
        assert!(outcome.is_correct);
        assert_eq!(outcome.lives_remaining, 3);

        let outcome = answer_wrong(&mut state);
        assert!(!outcome.is_correct);
        assert_eq!(outcome.lives_remaining, 2);
        assert!(!outcome.round_finished);

        let session = state.session().unwrap();
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.total_count, 2);
        assert_eq!(session.problem_index, 2);
    }

    #[test]
    fn test_full_round_of_correct_answers_shows_summary() {
        let mut state = started(4, 3);
        for _ in 0..3 {
            assert!(!answer_right(&mut state).round_finished);
        }
        let last = answer_right(&mut state);
        assert!(last.round_finished);
        assert!(!last.game_over);

        // Feedback is still showing
        assert_eq!(state.phase(), GamePhase::InRound);
        assert!(state.awaiting_summary());
        assert!(!state.tick(Duration::from_millis(999)));
        assert!(state.tick(Duration::from_millis(1)));

        assert_eq!(state.phase(), GamePhase::RoundSummary { ended: false });
        assert!(!state.session().unwrap().ended);
        assert_eq!(state.session().unwrap().correct_count, 4);
    }

    #[test]
    fn test_single_life_wrong_answer_ends_game() {
        let mut state = started(5, 1);
        let outcome = answer_wrong(&mut state);
        assert!(outcome.game_over);
        assert!(outcome.round_finished);
        assert_eq!(outcome.lives_remaining, 0);

        assert!(state.tick(FEEDBACK_DELAY));
        assert_eq!(state.phase(), GamePhase::RoundSummary { ended: true });
        assert!(state.session().unwrap().ended);
        assert_eq!(state.continue_round(), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn test_game_ends_when_lives_reach_zero() {
        let mut state = started(10, 2);
        assert!(!answer_wrong(&mut state).game_over);
        assert!(answer_wrong(&mut state).game_over);
        state.tick(FEEDBACK_DELAY);
        assert_eq!(state.phase(), GamePhase::RoundSummary { ended: true });
    }

    #[test]
    fn test_submit_rejected_while_awaiting_summary() {
        let mut state = started(1, 3);
        answer_right(&mut state);
        assert_eq!(
            state.submit_answer(0, &Silent),
            Err(GameError::AwaitingSummary)
        );
        // The rejected submission changed nothing
        assert_eq!(state.session().unwrap().total_count, 1);
    }

    #[test]
    fn test_continue_round_keeps_counters() {
        let mut state = started(2, 5);
        answer_wrong(&mut state);
        answer_right(&mut state);
        state.tick(FEEDBACK_DELAY);

        state.continue_round().unwrap();
        assert_eq!(state.phase(), GamePhase::InRound);
        let session = state.session().unwrap();
        assert_eq!(session.problem_index, 0);
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.total_count, 2);
        assert_eq!(session.lives_remaining, 4);
    }

    #[test]
    fn test_continue_round_needs_summary() {
        let mut state = started(5, 3);
        assert_eq!(state.continue_round(), Err(GameError::NoRoundSummary));
    }

    #[test]
    fn test_reset_cancels_pending_summary() {
        let store = MemoryStore::new();
        let mut state = started(1, 3);
        answer_right(&mut state);
        assert!(state.awaiting_summary());

        let scores = state.reset_game(&store);
        assert!(scores.is_empty());
        assert_eq!(state.phase(), GamePhase::SelectingDifficulty);
        assert!(state.session().is_none());

        // The stale deadline must not fire
        assert!(!state.tick(FEEDBACK_DELAY));
        assert_eq!(state.phase(), GamePhase::SelectingDifficulty);
    }

    #[test]
    fn test_reset_reloads_scores() {
        let store = MemoryStore::new();
        let mut state = started(1, 3);
        answer_right(&mut state);
        state.tick(FEEDBACK_DELAY);

        let record = state.score_record("Ana", Utc::now()).unwrap();
        highscores::append_score(&store, &record).unwrap();

        let scores = state.reset_game(&store);
        assert_eq!(scores, vec![record]);
    }

    #[test]
    fn test_saved_game_cannot_be_saved_again_after_reset() {
        let store = MemoryStore::new();
        let mut state = started(1, 3);
        answer_right(&mut state);
        state.tick(FEEDBACK_DELAY);

        let record = state.score_record("Ana", Utc::now()).unwrap();
        highscores::append_score(&store, &record).unwrap();
        state.reset_game(&store);

        assert_eq!(
            state.score_record("Ana", Utc::now()),
            Err(GameError::NoRoundSummary)
        );
        assert_eq!(highscores::load_scores(&store).len(), 1);
    }

    #[test]
    fn test_sound_follows_settings() {
        let recorder = Recorder::default();
        let mut state = started(5, 3);
        let problem = state.current_problem().unwrap();
        state.submit_answer(problem.answer(), &recorder).unwrap();
        let problem = state.current_problem().unwrap();
        state.submit_answer(problem.answer() + 2, &recorder).unwrap();
        assert_eq!(*recorder.calls.borrow(), vec![true, false]);

        let mut quiet = *state.settings();
        quiet.set_sound_enabled(false);
        state.update_settings(quiet);
        let problem = state.current_problem().unwrap();
        state.submit_answer(problem.answer(), &recorder).unwrap();
        assert_eq!(recorder.calls.borrow().len(), 2);
    }

    #[test]
    fn test_submit_outside_round() {
        let mut state = GameState::new(GameSettings::default(), 3);
        assert_eq!(state.submit_answer(4, &Silent), Err(GameError::NotInRound));
    }

    #[test]
    fn test_score_record() {
        let mut state = started(2, 3);
        answer_right(&mut state);
        assert_eq!(
            state.score_record("Mia", Utc::now()),
            Err(GameError::NoRoundSummary)
        );
        answer_wrong(&mut state);
        // Still showing feedback for the last answer
        assert_eq!(
            state.score_record("Mia", Utc::now()),
            Err(GameError::NoRoundSummary)
        );
        state.tick(FEEDBACK_DELAY);

        let record = state.score_record("  Mia ", Utc::now()).unwrap();
        assert_eq!(record.name, "Mia");
        assert_eq!(record.correct_answers, 1);
        assert_eq!(record.total_answers, 2);

        assert_eq!(
            state.score_record("   ", Utc::now()),
            Err(GameError::EmptyName)
        );
    }

    #[test]
    fn test_feedback_message() {
        let mut state = started(5, 3);
        let wrong = answer_wrong(&mut state);
        assert_eq!(
            state.feedback_message(&wrong),
            format!("Not quite. The correct answer is {}", wrong.correct_answer)
        );
        let right = answer_right(&mut state);
        assert!(PRAISE.contains(&state.feedback_message(&right).as_str()));
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut state1 = started(5, 3);
        let mut state2 = started(5, 3);
        for _ in 0..4 {
            assert_eq!(state1.current_problem(), state2.current_problem());
            answer_right(&mut state1);
            answer_right(&mut state2);
        }
    }
}
