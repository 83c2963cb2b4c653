//! Circuit breaker for the generative provider.
//!
//! # States
//! - Closed: calls pass through, outcomes feed a rolling window
//! - Open: calls fail fast with `CircuitOpen`, the wrapped call is never run
//! - Half-Open: a single probe call is in flight, everyone else fails fast
//!
//! # State Transitions
//! ```text
//! Closed → Open:      failure % over the window >= threshold (once the window
//!                     holds at least `minimum_samples` outcomes)
//! Open → Half-Open:   first call after `reset_timeout` becomes the probe
//! Half-Open → Closed: probe succeeds (window is cleared)
//! Half-Open → Open:   probe fails or is dropped (cooldown restarts)
//! ```
//!
//! All state lives behind one mutex. Admission and recording each take the
//! lock once, so the read, the threshold check and the transition are seen
//! as a single step by concurrent callers. The lock is never held across an
//! `.await`.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::ensure;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Upper bound for a single call; exceeding it counts as a failure.
    pub timeout: Duration,
    /// Failure percentage (1 to 100) over the window that opens the circuit.
    pub error_threshold_percentage: u8,
    /// Cooldown spent in Open before a probe is admitted.
    pub reset_timeout: Duration,
    /// Number of most recent outcomes considered.
    pub rolling_window_size: usize,
    /// Outcomes required in the window before the failure rate is evaluated.
    pub minimum_samples: usize,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500_000),
            error_threshold_percentage: 50,
            reset_timeout: Duration::from_millis(30_000),
            rolling_window_size: 10,
            minimum_samples: 1,
        }
    }
}

impl BreakerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.timeout.is_zero(), "breaker timeout must be greater than zero");
        ensure!(
            (1..=100).contains(&self.error_threshold_percentage),
            "breaker error threshold must be between 1 and 100, got {}",
            self.error_threshold_percentage
        );
        ensure!(
            self.rolling_window_size > 0,
            "breaker rolling window must hold at least one outcome"
        );
        ensure!(
            self.minimum_samples <= self.rolling_window_size,
            "breaker minimum samples ({}) exceeds the rolling window ({})",
            self.minimum_samples,
            self.rolling_window_size
        );
        Ok(())
    }
}

/// Externally visible snapshot of the breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Error)]
pub enum BreakerError<E> {
    #[error("circuit is open")]
    CircuitOpen,

    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("call failed: {0}")]
    Call(#[source] E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ticket {
    Normal,
    Probe,
}

#[derive(Debug)]
enum Phase {
    Closed,
    Open { since: Instant },
    HalfOpen,
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    window: VecDeque<Outcome>,
}

/// A single breaker guarding one provider endpoint.
///
/// Construct once at startup and share it (e.g. behind an `Arc`) between
/// every request that talks to the same endpoint.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        let window = VecDeque::with_capacity(config.rolling_window_size);
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                phase: Phase::Closed,
                window,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        match self.lock().phase {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen => CircuitState::HalfOpen,
        }
    }

    /// Runs `call` if the circuit admits it, bounded by the configured timeout.
    ///
    /// The outcome is recorded before returning. Errors from `call` come back
    /// as `BreakerError::Call`; nothing is retried.
    pub async fn execute<T, E, F, Fut>(&self, call: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ticket = self.admit().ok_or(BreakerError::CircuitOpen)?;
        let pending = Pending {
            breaker: self,
            ticket,
            settled: false,
        };

        let result = match tokio::time::timeout(self.config.timeout, call()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(BreakerError::Call(e)),
            Err(_) => Err(BreakerError::Timeout(self.config.timeout)),
        };

        pending.settle(if result.is_ok() {
            Outcome::Success
        } else {
            Outcome::Failure
        });
        result
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self) -> Option<Ticket> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match inner.phase {
            Phase::Closed => Some(Ticket::Normal),
            Phase::Open { since } if since.elapsed() >= self.config.reset_timeout => {
                inner.phase = Phase::HalfOpen;
                info!(breaker = %self.name, "Circuit half-open, admitting probe");
                Some(Ticket::Probe)
            }
            Phase::Open { .. } | Phase::HalfOpen => {
                debug!(breaker = %self.name, "Circuit open, rejecting call");
                None
            }
        }
    }

    fn record(&self, ticket: Ticket, outcome: Outcome) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let phase_matches = match ticket {
            Ticket::Probe => matches!(inner.phase, Phase::HalfOpen),
            Ticket::Normal => matches!(inner.phase, Phase::Closed),
        };
        if !phase_matches {
            // Outcome of a call admitted under a phase that has since ended.
            return;
        }

        match ticket {
            Ticket::Probe => match outcome {
                Outcome::Success => {
                    inner.phase = Phase::Closed;
                    inner.window.clear();
                    info!(breaker = %self.name, "Probe succeeded, circuit closed");
                }
                Outcome::Failure => {
                    inner.phase = Phase::Open {
                        since: Instant::now(),
                    };
                    warn!(breaker = %self.name, "Probe failed, circuit re-opened");
                }
            },
            Ticket::Normal => {
                inner.window.push_back(outcome);
                while inner.window.len() > self.config.rolling_window_size {
                    inner.window.pop_front();
                }
                if outcome == Outcome::Failure {
                    if let Some(rate) = self.tripping_rate(&inner.window) {
                        inner.phase = Phase::Open {
                            since: Instant::now(),
                        };
                        warn!(
                            breaker = %self.name,
                            failure_rate = rate,
                            samples = inner.window.len(),
                            "Failure threshold reached, circuit opened"
                        );
                    }
                }
            }
        }
    }

    /// Returns the failure percentage if it meets the threshold.
    fn tripping_rate(&self, window: &VecDeque<Outcome>) -> Option<usize> {
        let samples = window.len();
        if samples == 0 || samples < self.config.minimum_samples {
            return None;
        }
        let failures = window.iter().filter(|o| **o == Outcome::Failure).count();
        let rate = failures * 100 / samples;
        (failures * 100 >= self.config.error_threshold_percentage as usize * samples).then_some(rate)
    }
}

/// An admitted call that has not reported back yet.
///
/// A probe dropped before it settles (the request was cancelled) counts as a
/// failed probe so the breaker cannot stay half-open forever.
struct Pending<'a> {
    breaker: &'a CircuitBreaker,
    ticket: Ticket,
    settled: bool,
}

impl Pending<'_> {
    fn settle(mut self, outcome: Outcome) {
        self.settled = true;
        self.breaker.record(self.ticket, outcome);
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if !self.settled && self.ticket == Ticket::Probe {
            self.breaker.record(Ticket::Probe, Outcome::Failure);
        }
    }
}
