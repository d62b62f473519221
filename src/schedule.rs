//! Frame tokens and the resize debouncer.
//!
//! Time is always passed in by the caller, so the debouncer can be driven by
//! a real clock in the event loop and by hand in tests.

use std::time::{Duration, Instant};

/// Quiet period after the last resize event before the surface is resized.
pub const DEFAULT_RESIZE_QUIET: Duration = Duration::from_millis(100);

/// Identifies one requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(pub u64);

/// Coalesces a burst of values into the last one, released once no new value
/// arrived for the quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn notify(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Releases the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now >= deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drops the pending value, if any. Returns whether one was dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_QUIET)
    }
}
