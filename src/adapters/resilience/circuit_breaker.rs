//! In-memory circuit breaker.
//!
//! State is kept in atomics so `should_allow` and the record calls never
//! block. The last-failure instant sits behind a mutex. While half-open, at
//! most `half_open_max_requests` callers are let through.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use tracing::{info, warn};

use crate::ports::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

const CLOSED: u8 = 0;
const OPEN: u8 = 1;
const HALF_OPEN: u8 = 2;

fn decode(state: u8) -> CircuitState {
    match state {
        OPEN => CircuitState::Open,
        HALF_OPEN => CircuitState::HalfOpen,
        _ => CircuitState::Closed,
    }
}

#[derive(Debug)]
pub struct InMemoryCircuitBreaker {
    name: &'static str,
    config: CircuitBreakerConfig,
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    half_open_admitted: AtomicU32,
    opened_at: Mutex<Option<Instant>>,
}

impl InMemoryCircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            config,
            state: AtomicU8::new(CLOSED),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            half_open_admitted: AtomicU32::new(0),
            opened_at: Mutex::new(None),
        }
    }

    fn trip(&self) {
        *self.opened_at.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        self.success_count.store(0, Ordering::SeqCst);
        self.half_open_admitted.store(0, Ordering::SeqCst);
        if self.state.swap(OPEN, Ordering::SeqCst) != OPEN {
            warn!(circuit = self.name, "Circuit opened");
        }
    }

    fn recovery_elapsed(&self) -> bool {
        self.opened_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map_or(true, |at| at.elapsed() >= self.config.recovery_timeout)
    }

    fn admit_trial(&self) -> bool {
        let max = self.config.half_open_max_requests;
        self.half_open_admitted
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < max).then_some(n + 1))
            .is_ok()
    }
}

impl CircuitBreaker for InMemoryCircuitBreaker {
    fn state(&self) -> CircuitState {
        decode(self.state.load(Ordering::SeqCst))
    }

    fn should_allow(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => self.admit_trial(),
            CircuitState::Open => {
                if !self.recovery_elapsed() {
                    return false;
                }
                if self
                    .state
                    .compare_exchange(OPEN, HALF_OPEN, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    info!(circuit = self.name, "Circuit half-open, probing");
                }
                self.admit_trial()
            }
        }
    }

    fn record_success(&self) {
        match self.state() {
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    self.reset();
                    info!(circuit = self.name, "Circuit closed");
                }
            }
            _ => self.failure_count.store(0, Ordering::SeqCst),
        }
    }

    fn record_failure(&self) {
        match self.state() {
            CircuitState::HalfOpen => self.trip(),
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= self.config.failure_threshold {
                    self.trip();
                }
            }
            CircuitState::Open => {}
        }
    }

    fn reset(&self) {
        self.state.store(CLOSED, Ordering::SeqCst);
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        self.half_open_admitted.store(0, Ordering::SeqCst);
        *self.opened_at.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
