//! Feedback delay timer
//!
//! Holds at most one pending transition. Arming replaces whatever was
//! pending, so a stale deadline can never fire after a re-arm or cancel.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FeedbackTimer<T> {
    pending: Option<(Duration, T)>,
}

impl<T> Default for FeedbackTimer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> FeedbackTimer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer, cancelling any previous deadline
    pub fn arm(&mut self, delay: Duration, payload: T) {
        if self.pending.is_some() {
            log::debug!("Feedback timer re-armed, previous deadline cancelled");
        }
        self.pending = Some((delay, payload));
    }

    /// Disarm the timer. Returns the payload that will no longer fire.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending payload fires
    pub fn remaining(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(left, _)| *left)
    }

    /// Advance by `elapsed`. Yields the payload once, when the deadline passes.
    pub fn advance(&mut self, elapsed: Duration) -> Option<T> {
        let (left, _) = self.pending.as_mut()?;
        if elapsed < *left {
            *left -= elapsed;
            return None;
        }
        self.cancel()
    }
}
