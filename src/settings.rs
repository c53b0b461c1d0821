//! Game settings
//!
//! Persisted separately from scores. Every value is clamped at the input
//! boundary, so the stored document never holds an out-of-range number.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{self, KeyValueStore, SETTINGS_KEY};

/// A numeric field of the settings form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    ProblemsPerRound,
    MaxLives,
}

impl SettingsField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsField::ProblemsPerRound => "problemsPerRound",
            SettingsField::MaxLives => "maxLives",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "problemsperround" | "problems" => Some(SettingsField::ProblemsPerRound),
            "maxlives" | "lives" => Some(SettingsField::MaxLives),
            _ => None,
        }
    }

    /// Inclusive bounds for this field
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            SettingsField::ProblemsPerRound => (MIN_PROBLEMS_PER_ROUND, MAX_PROBLEMS_PER_ROUND),
            SettingsField::MaxLives => (MIN_LIVES, MAX_LIVES),
        }
    }

    /// Clamp any integer into this field's bounds
    pub fn clamp(&self, value: i64) -> u32 {
        let (min, max) = self.bounds();
        value.clamp(min as i64, max as i64) as u32
    }

    /// Interpret raw form input: the leading integer, clamped.
    /// Input without one falls back to the lower bound.
    pub fn parse_input(&self, raw: &str) -> u32 {
        match parse_leading_int(raw) {
            Some(value) if value != 0 => self.clamp(value),
            _ => self.bounds().0,
        }
    }
}

/// Parse an optional sign followed by digits at the start of `raw`,
/// ignoring leading whitespace and anything after the digits
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs; they clamp to a bound anyway
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Game settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Problems shown per round
    pub problems_per_round: u32,
    /// Wrong answers allowed before the game ends
    pub max_lives: u32,
    /// Whether answers trigger feedback sounds
    pub sound_enabled: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            problems_per_round: DEFAULT_PROBLEMS_PER_ROUND,
            max_lives: DEFAULT_MAX_LIVES,
            sound_enabled: true,
        }
    }
}

impl GameSettings {
    /// Current value of a numeric field
    pub fn get(&self, field: SettingsField) -> u32 {
        match field {
            SettingsField::ProblemsPerRound => self.problems_per_round,
            SettingsField::MaxLives => self.max_lives,
        }
    }

    /// Set a numeric field, clamping into bounds. Returns the stored value.
    pub fn set(&mut self, field: SettingsField, value: i64) -> u32 {
        let value = field.clamp(value);
        match field {
            SettingsField::ProblemsPerRound => self.problems_per_round = value,
            SettingsField::MaxLives => self.max_lives = value,
        }
        value
    }

    /// Apply raw form input to a numeric field. Returns the stored value.
    pub fn apply_input(&mut self, field: SettingsField, raw: &str) -> u32 {
        let value = field.parse_input(raw);
        self.set(field, value as i64)
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    /// Copy with every numeric field pulled into bounds
    pub fn clamped(mut self) -> Self {
        self.problems_per_round = SettingsField::ProblemsPerRound.clamp(self.problems_per_round as i64);
        self.max_lives = SettingsField::MaxLives.clamp(self.max_lives as i64);
        self
    }

    /// Load the stored settings document, if present and well-formed
    pub fn load_stored<S: KeyValueStore + ?Sized>(store: &S) -> Option<Self> {
        persistence::load_json::<Self, _>(store, SETTINGS_KEY).map(Self::clamped)
    }

    /// Load settings, falling back to defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match Self::load_stored(store) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Overwrite the stored settings document
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> persistence::Result<()> {
        persistence::save_json(store, SETTINGS_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

/// Stored settings, or `None` when absent or malformed
pub fn load_settings<S: KeyValueStore + ?Sized>(store: &S) -> Option<GameSettings> {
    GameSettings::load_stored(store)
}

/// Overwrite the stored settings document
pub fn save_settings<S: KeyValueStore + ?Sized>(store: &S, settings: &GameSettings) -> persistence::Result<()> {
    settings.save(store)
}
