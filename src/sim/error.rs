use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("Difficulty can only be chosen from the start screen")]
    NotSelecting,
    #[error("No round is in progress")]
    NotInRound,
    #[error("Round is over, waiting to show the summary")]
    AwaitingSummary,
    #[error("No round summary is showing")]
    NoRoundSummary,
    #[error("Game already ended, start a new game to keep playing")]
    AlreadyEnded,
    #[error("No game has been started")]
    NoSession,
    #[error("Player name must not be empty")]
    EmptyName,
}

pub type Result<T> = std::result::Result<T, GameError>;
