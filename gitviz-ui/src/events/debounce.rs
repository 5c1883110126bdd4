use std::time::{Duration, Instant};
use crate::events::types::RepositoryEvent;

/// Collapses a burst of events into one, released after `window` of quiet
pub struct EventDebouncer {
    pending: Option<RepositoryEvent>,
    last: Instant,
    window: Duration,
}

impl EventDebouncer {
    pub fn new(window: Duration) -> Self {
        Self { pending: None, last: Instant::now(), window }
    }
    pub fn add(&mut self, ev: RepositoryEvent) {
        self.pending = Some(ev);
        self.last = Instant::now();
    }
    pub fn take_if_ready(&mut self) -> Option<RepositoryEvent> {
        if self.pending.is_some() && self.last.elapsed() >= self.window {
            self.pending.take()
        } else { None }
    }

    /// Time left before the pending event is released, if any is pending
    pub fn remaining(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|_| self.window.saturating_sub(self.last.elapsed()))
    }
}
