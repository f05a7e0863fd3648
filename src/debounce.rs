//! Trailing-edge debounce keyed by revision
//!
//! Each [`Debouncer::trigger`] supersedes every earlier one. The caller arms a
//! timer for the returned revision; when it fires, [`Debouncer::fire`] answers
//! whether that revision is still the latest, so a burst of events collapses
//! into a single trailing action.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    revision: u64,
    fired: u64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            revision: 0,
            fired: 0,
        }
    }

    pub fn from_millis(ms: u32) -> Self {
        Self::new(Duration::from_millis(u64::from(ms)))
    }

    /// Quiet period a trigger must survive before firing
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register an event. Returns the revision the caller's timer must carry.
    pub fn trigger(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    /// Whether `revision` is the latest trigger and has not fired yet
    pub fn is_current(&self, revision: u64) -> bool {
        revision == self.revision && revision > self.fired
    }

    /// Consume an elapsed timer. Returns true exactly once per quiet period.
    pub fn fire(&mut self, revision: u64) -> bool {
        if !self.is_current(revision) {
            return false;
        }
        self.fired = revision;
        true
    }

    /// Whether a trigger is waiting for its timer
    pub fn is_pending(&self) -> bool {
        self.revision > self.fired
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::from_millis(100)
    }
}
