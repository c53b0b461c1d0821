//! Owned `setTimeout` handle
//!
//! The pending callback is cleared when the handle drops, so replacing or
//! dropping a `Timeout` guarantees its callback never runs afterwards.

use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub struct Timeout {
    handle: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Timeout {
    /// Schedule `callback` after `delay`; `None` if there is no window
    pub fn schedule(delay: Duration, callback: impl FnOnce() + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let mut callback = Some(callback);
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(callback) = callback.take() {
                callback();
            }
        });
        let handle = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay.as_millis() as i32,
            )
            .ok()?;
        Some(Self {
            handle,
            _closure: closure,
        })
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.handle);
        }
    }
}
