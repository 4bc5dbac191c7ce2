//! Circuit breaker for the external scorer.
//!
//! Closed: calls flow. After `threshold` consecutive failures the breaker
//! opens and calls are short-circuited. Once `cooldown` has passed, a single
//! trial call is let through (half-open); its outcome closes or reopens it.
//! A trial whose permit is dropped unsettled counts as a failed trial.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Default)]
struct Inner {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            cooldown,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A permit for one outgoing call, or `None` while the breaker is open.
    /// Claims the trial slot when the cooldown has elapsed.
    pub fn allow(&self) -> Option<Permit<'_>> {
        let mut inner = self.lock();
        let trial = match inner.opened_at {
            None => false,
            Some(opened) if !inner.trial_in_flight && opened.elapsed() >= self.cooldown => {
                inner.trial_in_flight = true;
                true
            }
            Some(_) => return None,
        };
        Some(Permit {
            breaker: self,
            trial,
            settled: false,
        })
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        *inner = Inner::default();
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        if inner.trial_in_flight || inner.consecutive_failures >= self.threshold {
            inner.opened_at = Some(Instant::now());
            inner.trial_in_flight = false;
        }
    }

    fn abandon_trial(&self) {
        let mut inner = self.lock();
        if inner.trial_in_flight {
            inner.trial_in_flight = false;
            inner.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self) -> BreakerState {
        let inner = self.lock();
        match (inner.opened_at, inner.trial_in_flight) {
            (None, _) => BreakerState::Closed,
            (Some(_), true) => BreakerState::HalfOpen,
            (Some(_), false) => BreakerState::Open,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }
}

/// One admitted call. Settle it with [`Permit::succeed`] or
/// [`Permit::fail`]; dropping an unsettled trial reopens the breaker.
#[derive(Debug)]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl Permit<'_> {
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn succeed(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    pub fn fail(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if self.trial && !self.settled {
            self.breaker.abandon_trial();
        }
    }
}
