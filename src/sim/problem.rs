//! Arithmetic problem generation
//!
//! Problems are drawn from a caller-owned RNG so that a seeded game
//! replays the same sequence.

use std::fmt;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Difficulty level, choosing the operand range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Operands 1-10
    Easy,
    /// Operands 5-20, sums capped at 20
    Medium,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" | "e" => Some(Difficulty::Easy),
            "medium" | "med" | "m" => Some(Difficulty::Medium),
            _ => None,
        }
    }

    /// Short description of the number range
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "numbers 1 to 10",
            Difficulty::Medium => "numbers up to 20",
        }
    }

    /// Inclusive operand range
    pub fn operand_range(&self) -> RangeInclusive<u32> {
        match self {
            Difficulty::Easy => EASY_MIN..=EASY_MAX,
            Difficulty::Medium => MEDIUM_MIN..=MEDIUM_MAX,
        }
    }
}

/// Which operations a game asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Addition,
    Subtraction,
    /// Addition or subtraction, chosen per problem
    Mixed,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Addition => "addition",
            GameMode::Subtraction => "subtraction",
            GameMode::Mixed => "mixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "addition" | "add" | "+" => Some(GameMode::Addition),
            "subtraction" | "sub" | "-" => Some(GameMode::Subtraction),
            "mixed" | "mix" => Some(GameMode::Mixed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Addition => "Addition",
            GameMode::Subtraction => "Subtraction",
            GameMode::Mixed => "Mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
}

impl Operation {
    pub fn symbol(&self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Sub => '-',
        }
    }
}

/// A single problem; under `Sub`, `a >= b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub a: u32,
    pub b: u32,
    pub operation: Operation,
}

impl Problem {
    pub fn answer(&self) -> i64 {
        let (a, b) = (self.a as i64, self.b as i64);
        match self.operation {
            Operation::Add => a + b,
            Operation::Sub => a - b,
        }
    }

    pub fn is_correct(&self, value: i64) -> bool {
        value == self.answer()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.a, self.operation.symbol(), self.b)
    }
}

/// Generate a problem for the given difficulty and mode
pub fn generate<R: Rng + ?Sized>(difficulty: Difficulty, mode: GameMode, rng: &mut R) -> Problem {
    let range = difficulty.operand_range();
    let mut a = rng.random_range(range.clone());
    let mut b = rng.random_range(range.clone());

    let operation = match mode {
        GameMode::Addition => Operation::Add,
        GameMode::Subtraction => Operation::Sub,
        GameMode::Mixed => {
            if rng.random_bool(0.5) {
                Operation::Add
            } else {
                Operation::Sub
            }
        }
    };

    match operation {
        Operation::Sub => {
            if a < b {
                std::mem::swap(&mut a, &mut b);
            }
        }
        Operation::Add if difficulty == Difficulty::Medium => {
            // About a quarter of draws pass, so a few retries at most
            while a + b > MEDIUM_SUM_CAP {
                a = rng.random_range(range.clone());
                b = rng.random_range(range.clone());
            }
        }
        Operation::Add => {}
    }

    Problem { a, b, operation }
}
