//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, JSON files on native)
//! - Audio clips (`<audio>` elements on web, terminal bell on native)
//! - Timers (owned `setTimeout` handles on web)

pub mod audio;
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod timeout;
