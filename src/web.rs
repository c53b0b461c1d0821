//! JavaScript-facing game handle
//!
//! The page renders; this owns the game. Structured results cross the
//! boundary as JSON strings.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::audio::AudioNotifier;
use crate::consts::FEEDBACK_DELAY;
use crate::highscores::{self, SortBy};
use crate::persistence::{KeyValueStore, MemoryStore};
use crate::platform::audio::WebClips;
use crate::platform::storage::LocalStorage;
use crate::platform::timeout::Timeout;
use crate::settings::{GameSettings, SettingsField, parse_leading_int};
use crate::sim::{Difficulty, GameMode, GameState};

/// Module start: panic messages and logs go to the browser console
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Math Adventure starting...");
}

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

struct Inner {
    state: GameState,
    store: Box<dyn KeyValueStore>,
    audio: AudioNotifier<WebClips>,
    /// Pending round-summary timeout; replaced on re-arm, cleared on drop
    timeout: Option<Timeout>,
    on_change: Option<js_sys::Function>,
}

#[wasm_bindgen]
pub struct MathGame {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl MathGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> MathGame {
        let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(err) => {
                log::warn!("{err} - scores and settings will not persist");
                Box::new(MemoryStore::new())
            }
        };
        let settings = GameSettings::load(&store);
        let seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {}", seed);

        MathGame {
            inner: Rc::new(RefCell::new(Inner {
                state: GameState::new(settings, seed),
                store,
                audio: AudioNotifier::new(WebClips::new()),
                timeout: None,
                on_change: None,
            })),
        }
    }

    /// Register a callback for state changes the page did not trigger
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().on_change = Some(callback);
    }

    #[wasm_bindgen(js_name = selectDifficulty)]
    pub fn select_difficulty(&self, difficulty: &str) -> Result<(), JsValue> {
        let difficulty = parse_difficulty(difficulty)?;
        self.inner
            .borrow_mut()
            .state
            .select_difficulty(difficulty)
            .map_err(js_error)
    }

    pub fn start(&self, difficulty: &str, mode: &str) -> Result<(), JsValue> {
        let difficulty = parse_difficulty(difficulty)?;
        let mode = GameMode::from_str(mode).ok_or_else(|| js_error(format!("Unknown mode: {mode}")))?;
        self.inner
            .borrow_mut()
            .state
            .start_game(difficulty, mode)
            .map_err(js_error)
    }

    /// Submit raw answer input. Returns the outcome with a feedback message.
    pub fn submit(&self, raw: &str) -> Result<String, JsValue> {
        let value = parse_leading_int(raw).ok_or_else(|| js_error("Please enter a number"))?;

        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        let outcome = inner
            .state
            .submit_answer(value, &inner.audio)
            .map_err(js_error)?;
        let message = inner.state.feedback_message(&outcome);

        if outcome.round_finished {
            inner.timeout = Timeout::schedule(FEEDBACK_DELAY, self.summary_callback());
            if inner.timeout.is_none() {
                // No browser timer; show the summary straight away
                inner.state.tick(FEEDBACK_DELAY);
            }
        }

        to_json(&serde_json::json!({
            "outcome": outcome,
            "message": message,
        }))
    }

    #[wasm_bindgen(js_name = continueRound)]
    pub fn continue_round(&self) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .state
            .continue_round()
            .map_err(js_error)
    }

    /// Back to the start screen. Returns the reloaded scores.
    pub fn reset(&self) -> Result<String, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        inner.timeout = None;
        let scores = inner.state.reset_game(&inner.store);
        to_json(&scores)
    }

    pub fn snapshot(&self) -> Result<String, JsValue> {
        to_json(&self.inner.borrow().state.snapshot())
    }

    /// Ranked leaderboard rows, sorted by "percentage" or "total"
    pub fn leaderboard(&self, sort: &str) -> Result<String, JsValue> {
        let by = SortBy::from_str(sort).unwrap_or_default();
        let scores = highscores::load_scores(&self.inner.borrow().store);
        to_json(&highscores::leaderboard(&scores, by, chrono::Utc::now()))
    }

    /// Save the finished game and return to the start screen.
    /// Returns the reloaded scores.
    #[wasm_bindgen(js_name = saveScore)]
    pub fn save_score(&self, name: &str) -> Result<String, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        let record = inner
            .state
            .score_record(name, chrono::Utc::now())
            .map_err(js_error)?;
        highscores::append_score(&inner.store, &record).map_err(js_error)?;

        inner.timeout = None;
        let scores = inner.state.reset_game(&inner.store);
        to_json(&scores)
    }

    #[wasm_bindgen(js_name = clearScores)]
    pub fn clear_scores(&self) -> Result<(), JsValue> {
        highscores::clear_scores(&self.inner.borrow().store).map_err(js_error)
    }

    pub fn settings(&self) -> Result<String, JsValue> {
        to_json(self.inner.borrow().state.settings())
    }

    /// Apply raw form input to "problemsPerRound" or "maxLives". Returns the clamped value.
    #[wasm_bindgen(js_name = setSetting)]
    pub fn set_setting(&self, field: &str, raw: &str) -> Result<u32, JsValue> {
        let field = SettingsField::from_str(field)
            .ok_or_else(|| js_error(format!("Unknown setting: {field}")))?;
        self.update_settings(|settings| settings.apply_input(field, raw))
    }

    #[wasm_bindgen(js_name = setSoundEnabled)]
    pub fn set_sound_enabled(&self, enabled: bool) -> Result<(), JsValue> {
        self.update_settings(|settings| settings.set_sound_enabled(enabled))
    }

    #[wasm_bindgen(js_name = audioReady)]
    pub fn audio_ready(&self) -> bool {
        self.inner.borrow().audio.is_ready()
    }
}

impl MathGame {
    /// Change settings, persist them and hand them to the controller
    fn update_settings<T>(&self, change: impl FnOnce(&mut GameSettings) -> T) -> Result<T, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let mut settings = *inner.state.settings();
        let result = change(&mut settings);
        settings.save(&inner.store).map_err(js_error)?;
        inner.state.update_settings(settings);
        Ok(result)
    }

    /// Fires the feedback delay and tells the page
    fn summary_callback(&self) -> impl FnOnce() + 'static {
        let weak = Rc::downgrade(&self.inner);
        move || {
            let Some(inner) = weak.upgrade() else { return };
            let callback = {
                let mut inner = inner.borrow_mut();
                inner.state.tick(FEEDBACK_DELAY);
                inner.on_change.clone()
            };
            if let Some(callback) = callback {
                if let Err(err) = callback.call0(&JsValue::NULL) {
                    log::warn!("onChange callback failed: {:?}", err);
                }
            }
        }
    }
}

impl Default for MathGame {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_difficulty(s: &str) -> Result<Difficulty, JsValue> {
    Difficulty::from_str(s).ok_or_else(|| js_error(format!("Unknown difficulty: {s}")))
}
