//! Adaptive request pacing
//!
//! One `AdaptiveRateController` is shared by every in-flight request of a
//! session. Before each outbound request the caller awaits [`wait`], which
//! spaces requests `1 / current_rate` seconds apart and adds a random jitter.
//! The rate grows by 10% after every success (capped at `max_rate`) and
//! shrinks by 10% after every HTTP 429 (floored at 1 request/second).
//!
//! [`wait`]: AdaptiveRateController::wait

use crate::config::RateLimitConfig;
use rand::Rng;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Lowest rate the controller will ever use, in requests per second
pub const MIN_RATE: f64 = 1.0;

const INCREASE_FACTOR: f64 = 1.1;
const DECREASE_FACTOR: f64 = 0.9;

/// Shared pacing state
#[derive(Debug, Clone, Copy)]
pub struct RateState {
    /// Current rate in requests per second, within `[MIN_RATE, max_rate]`
    pub current_rate: f64,

    /// Slot reserved by the most recent request
    pub last_request: Option<Instant>,
}

/// Paces outbound requests and adapts the rate to server feedback
#[derive(Debug)]
pub struct AdaptiveRateController {
    state: Mutex<RateState>,
    max_rate: f64,
    min_jitter: Duration,
    max_jitter: Duration,
}

impl AdaptiveRateController {
    /// Creates a controller; `initial_rate` is clamped into `[1, max_rate]`
    pub fn new(initial_rate: f64, max_rate: f64, min_jitter: Duration, max_jitter: Duration) -> Self {
        let max_rate = max_rate.max(MIN_RATE);
        Self {
            state: Mutex::new(RateState {
                current_rate: initial_rate.clamp(MIN_RATE, max_rate),
                last_request: None,
            }),
            max_rate,
            min_jitter,
            max_jitter: max_jitter.max(min_jitter),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.initial_rate,
            config.max_rate,
            Duration::from_millis(config.min_jitter_ms),
            Duration::from_millis(config.max_jitter_ms),
        )
    }

    pub fn current_rate(&self) -> f64 {
        self.lock().current_rate
    }

    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }

    /// Returns a snapshot of the shared state
    pub fn snapshot(&self) -> RateState {
        *self.lock()
    }

    /// Suspends until this caller's request slot arrives
    ///
    /// Must be awaited immediately before every outbound request.
    pub async fn wait(&self) {
        let delay = self.reserve(Instant::now()) + self.sample_jitter();
        if !delay.is_zero() {
            tracing::trace!(delay_ms = delay.as_millis() as u64, "pacing request");
            tokio::time::sleep(delay).await;
        }
    }

    /// Reserves the next request slot and returns how long to wait for it
    ///
    /// The slot is `max(now, last_slot + 1/rate)`. It is stamped before the
    /// lock is released, so concurrent callers receive successive slots one
    /// interval apart and no caller ever computes a negative delay.
    pub fn reserve(&self, now: Instant) -> Duration {
        let mut state = self.lock();
        let interval = Duration::from_secs_f64(1.0 / state.current_rate);
        let slot = match state.last_request {
            Some(last) => (last + interval).max(now),
            None => now,
        };
        state.last_request = Some(slot);
        slot.saturating_duration_since(now)
    }

    /// Called after an HTTP 2xx response
    pub fn increase_rate(&self) {
        let mut state = self.lock();
        state.current_rate = (state.current_rate * INCREASE_FACTOR).min(self.max_rate);
    }

    /// Called after an HTTP 429 response
    pub fn decrease_rate(&self) {
        let mut state = self.lock();
        state.current_rate = (state.current_rate * DECREASE_FACTOR).max(MIN_RATE);
        tracing::debug!(rate = state.current_rate, "request rate decreased");
    }

    fn sample_jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let min = self.min_jitter.as_micros() as u64;
        let max = self.max_jitter.as_micros() as u64;
        Duration::from_micros(rand::rng().random_range(min..=max))
    }

    fn lock(&self) -> MutexGuard<'_, RateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
