//! Circuit breaker over the external embedding/chunking service (§4.8).
//!
//! Three states, `closed -> open -> half_open -> closed`, with exponential
//! backoff while open. A single `Mutex<State>` is enough: the worker is a
//! single cooperative task, never called concurrently from two callers.

use crate::config::CircuitBreakerConfig as CircuitBreakerSettings;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls are allowed; failures accumulate toward `failure_threshold`.
    Closed,
    /// Calls are blocked until `recovery_timeout` has elapsed.
    Open,
    /// A single trial call is allowed to decide whether to close again.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
}

/// Circuit breaker over a single external dependency (the embedding
/// service). `failure_threshold` consecutive failures trip it open;
/// after `recovery_timeout` it allows one trial call (half-open); after
/// `success_threshold` consecutive successes it closes again.
pub struct CircuitBreaker {
    config: CircuitBreakerSettings,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a new breaker, starting closed.
    pub fn new(config: CircuitBreakerSettings) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                opened_at: None,
            }),
        }
    }

    /// Whether a call may currently be attempted. Transitions `open` to
    /// `half_open` as a side effect once `recovery_timeout` has elapsed.
    pub fn is_call_permitted(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let recovery_timeout = Duration::from_secs(self.config.recovery_timeout);
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= recovery_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.consecutive_successes = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                inner.consecutive_successes += 1;
                if inner.consecutive_successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.consecutive_successes = 0;
                    inner.opened_at = None;
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                inner.consecutive_failures += 1;
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.consecutive_successes = 0;
            }
            CircuitState::Open => {
                inner.consecutive_failures += 1;
            }
        }
    }

    /// Current state, for logging/diagnostics.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().unwrap().state
    }

    /// Backoff to wait before the next attempt while open:
    /// `min(max_backoff, initial_backoff * backoff_multiplier^(failures-1))`.
    pub fn backoff(&self) -> Duration {
        let inner = self.inner.lock().unwrap();
        let failures = inner.consecutive_failures.max(1);
        let scaled = self.config.initial_backoff * self.config.backoff_multiplier.powi(failures as i32 - 1);
        Duration::from_secs_f64(scaled.min(self.config.max_backoff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CircuitBreakerSettings {
        CircuitBreakerSettings {
            failure_threshold: 3,
            recovery_timeout: 0,
            success_threshold: 2,
            initial_backoff: 1.0,
            max_backoff: 60.0,
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn opens_after_reaching_the_failure_threshold() {
        let breaker = CircuitBreaker::new(settings());
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn half_opens_once_recovery_timeout_has_elapsed_then_closes_after_successes() {
        let breaker = CircuitBreaker::new(settings());
        for _ in 0..3 {
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), CircuitState::Open);

        assert!(breaker.is_call_permitted());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn a_failure_while_half_open_reopens_the_circuit() {
        let breaker = CircuitBreaker::new(settings());
        for _ in 0..3 {
            breaker.record_failure();
        }
        assert!(breaker.is_call_permitted());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn backoff_grows_exponentially_and_is_capped_at_max_backoff() {
        let mut settings = settings();
        settings.recovery_timeout = 999;
        let breaker = CircuitBreaker::new(settings);
        breaker.record_failure();
        assert_eq!(breaker.backoff(), Duration::from_secs_f64(1.0));
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.backoff(), Duration::from_secs_f64(4.0));
        for _ in 0..10 {
            breaker.record_failure();
        }
        assert_eq!(breaker.backoff(), Duration::from_secs_f64(60.0));
    }
}
