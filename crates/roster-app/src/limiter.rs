// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Timer-armed pending actions driven by an explicit clock.
//!
//! Neither limiter spawns threads or owns a timer. The event loop passes the
//! current [`Instant`] into `call` and `poll`, and fires whatever comes back.

use std::time::{Duration, Instant};

/// `from + delay`, or `from` itself when the sum does not fit in an
/// [`Instant`].
fn deadline(from: Instant, delay: Duration) -> Instant {
    from.checked_add(delay).unwrap_or(from)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending<T> {
    due: Instant,
    value: T,
}

/// Fires the most recent value once input has been quiet for `wait`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub const fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    /// Supersedes any pending value and restarts the quiet period.
    pub fn call(&mut self, now: Instant, value: T) {
        self.pending = Some(Pending {
            due: deadline(now, self.wait),
            value,
        });
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.due <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Fires the pending value immediately, if any.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }
}

/// Fires at most once per `interval`. The first call after a quiet interval
/// fires immediately; later calls inside the interval collapse into one
/// trailing fire carrying the latest value.
#[derive(Debug, Clone)]
pub struct Throttler<T> {
    interval: Duration,
    last_fired: Option<Instant>,
    pending: Option<Pending<T>>,
}

impl<T> Throttler<T> {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            pending: None,
        }
    }

    pub fn call(&mut self, now: Instant, value: T) -> Option<T> {
        let ready = self
            .last_fired
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if ready {
            self.pending = None;
            self.last_fired = Some(now);
            return Some(value);
        }

        let due = match (&self.pending, self.last_fired) {
            (Some(pending), _) => pending.due,
            (None, Some(last)) => deadline(last, self.interval),
            (None, None) => now,
        };
        self.pending = Some(Pending { due, value });
        None
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.due <= now => {
                self.last_fired = Some(now);
                self.pending.take().map(|p| p.value)
            }
            _ => None,
        }
    }

    /// Drops the trailing fire and forgets the last fire time.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_fired = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }
}
