//! Failure isolation for outbound provider calls.
//!
//! Every call to the generative provider goes through one `CircuitBreaker`
//! owned by the application state. There is no retry at this layer: a
//! failure is returned to the caller and only changes future admission.

pub mod circuit_breaker;

pub use circuit_breaker::{BreakerConfig, BreakerError, CircuitBreaker};
