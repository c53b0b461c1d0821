//! Answer feedback sounds
//!
//! Two short pre-loaded clips, one per answer outcome. Playback is
//! best-effort: until both clips report they can play through, `notify`
//! does nothing, and any playback failure is logged and dropped.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use crate::consts::{CORRECT_CLIP_PATH, INCORRECT_CLIP_PATH};

/// Sound clip types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clip {
    /// Answer was right
    Correct,
    /// Answer was wrong
    Incorrect,
}

impl Clip {
    pub const ALL: [Clip; 2] = [Clip::Correct, Clip::Incorrect];

    pub fn for_answer(is_correct: bool) -> Self {
        if is_correct {
            Clip::Correct
        } else {
            Clip::Incorrect
        }
    }

    /// Resource path of the clip
    pub fn path(&self) -> &'static str {
        match self {
            Clip::Correct => CORRECT_CLIP_PATH,
            Clip::Incorrect => INCORRECT_CLIP_PATH,
        }
    }

    fn index(&self) -> usize {
        match self {
            Clip::Correct => 0,
            Clip::Incorrect => 1,
        }
    }
}

/// Preload progress of one clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Clip {0:?} is not available")]
    Unavailable(Clip),
    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Shared preload state of the clip set
///
/// Backends hold a clone and resolve each clip from their load callbacks.
/// A clip settles once; later reports for it are ignored.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    clips: Rc<Cell<[LoadState; 2]>>,
}

impl Readiness {
    pub fn state(&self, clip: Clip) -> LoadState {
        self.clips.get()[clip.index()]
    }

    /// Mark a clip as ready to play through
    pub fn loaded(&self, clip: Clip) {
        if self.settle(clip, LoadState::Loaded) && self.is_ready() {
            log::info!("Audio clips ready");
        }
    }

    /// Mark a clip as failed; audio stays silent from then on
    pub fn failed(&self, clip: Clip) {
        if self.settle(clip, LoadState::Failed) {
            log::warn!("Failed to load audio clip {} - audio disabled", clip.path());
        }
    }

    /// True once every clip has loaded
    pub fn is_ready(&self) -> bool {
        self.clips.get().iter().all(|s| *s == LoadState::Loaded)
    }

    fn settle(&self, clip: Clip, state: LoadState) -> bool {
        let mut clips = self.clips.get();
        if clips[clip.index()] != LoadState::Loading {
            return false;
        }
        clips[clip.index()] = state;
        self.clips.set(clips);
        true
    }
}

/// Platform side of clip playback
pub trait ClipBackend {
    /// Begin loading `clip`, reporting the outcome through `readiness`
    fn preload(&mut self, clip: Clip, readiness: Readiness);
    /// Start playing `clip` from the beginning without waiting for it
    fn play(&self, clip: Clip) -> Result<(), AudioError>;
}

/// Anything that reacts to an answer with a sound
pub trait AnswerSound {
    fn notify(&self, is_correct: bool);
}

/// No sound at all
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AnswerSound for Silent {
    fn notify(&self, _is_correct: bool) {}
}

/// Audio notifier for answer feedback
pub struct AudioNotifier<B> {
    backend: B,
    readiness: Readiness,
}

impl<B: ClipBackend> AudioNotifier<B> {
    /// Take ownership of a backend and start preloading both clips
    pub fn new(mut backend: B) -> Self {
        let readiness = Readiness::default();
        for clip in Clip::ALL {
            backend.preload(clip, readiness.clone());
        }
        Self { backend, readiness }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }
}

impl<B: ClipBackend> AnswerSound for AudioNotifier<B> {
    fn notify(&self, is_correct: bool) {
        if !self.is_ready() {
            return;
        }
        if let Err(err) = self.backend.play(Clip::for_answer(is_correct)) {
            log::warn!("Error playing sound: {err}");
        }
    }
}
