//! Rate limiting for high-frequency event streams
//!
//! Wraps a raw input-change stream so the typeahead path cannot flood the
//! network layer. The clock is injected through `Instant` arguments, which
//! keeps the state machine deterministic and testable without timers.

use std::time::{Duration, Instant};

/// Rate-limiting strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceMode {
    /// Reset the timer on each event; fire the most recent payload after a
    /// quiet period. Intermediate payloads are dropped.
    Delay,
    /// Fire at most once per period, with the payload that opened the
    /// window. Later events in the window are dropped.
    Throttle,
}

/// A debounced event source
#[derive(Debug)]
pub struct Debouncer<T> {
    mode: DebounceMode,
    period: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(mode: DebounceMode, period: Duration) -> Self {
        Self {
            mode,
            period,
            pending: None,
        }
    }

    /// Record an event at `now`
    pub fn feed(&mut self, payload: T, now: Instant) {
        match self.mode {
            DebounceMode::Delay => {
                self.pending = Some((payload, now + self.period));
            }
            DebounceMode::Throttle => {
                if self.pending.is_none() {
                    self.pending = Some((payload, now + self.period));
                }
            }
        }
    }

    /// Take the pending payload if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {
                self.pending.take().map(|(payload, _)| payload)
            }
            _ => None,
        }
    }

    /// Whether an event is waiting to fire
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
