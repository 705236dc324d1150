use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// States of the breaker guarding the bank simulator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, calls go through.
    Closed,
    /// Calls are short-circuited to the fallback without hitting the network.
    Open,
    /// One trial call is allowed to probe recovery.
    HalfOpen,
}

/// Tracks consecutive bank-call failures and opens the circuit once a
/// configured threshold is reached.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    failure_count: AtomicU32,
    opened_at: AtomicU64,
    start: Instant,
    failure_threshold: u32,
    open_timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, open_timeout: Duration) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            opened_at: AtomicU64::new(0),
            start: Instant::now(),
            failure_threshold,
            open_timeout,
        }
    }

    /// Whether a call is currently allowed through. Transitions `Open` to
    /// `HalfOpen` as a side effect once the open timeout has elapsed.
    pub fn allow_request(&self) -> bool {
        let state = *self.state.read().unwrap();
        match state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = self.start.elapsed().as_millis() as u64;
                let opened_at = self.opened_at.load(Ordering::Relaxed);
                if elapsed.saturating_sub(opened_at) >= self.open_timeout.as_millis() as u64 {
                    *self.state.write().unwrap() = CircuitState::HalfOpen;
                    tracing::info!("bank circuit breaker transitioning to half-open");
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.write().unwrap();
        match *state {
            CircuitState::HalfOpen => {
                *state = CircuitState::Closed;
                self.failure_count.store(0, Ordering::Relaxed);
                tracing::info!("bank circuit breaker closed after successful probe");
            }
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.state.write().unwrap();
        match *state {
            CircuitState::HalfOpen => {
                self.opened_at
                    .store(self.start.elapsed().as_millis() as u64, Ordering::Relaxed);
                *state = CircuitState::Open;
                tracing::warn!("bank circuit breaker probe failed, reopening");
            }
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
                if failures >= self.failure_threshold {
                    self.opened_at
                        .store(self.start.elapsed().as_millis() as u64, Ordering::Relaxed);
                    *state = CircuitState::Open;
                    tracing::error!(
                        failures,
                        threshold = self.failure_threshold,
                        "bank circuit breaker opened"
                    );
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        *self.state.read().unwrap()
    }
}
