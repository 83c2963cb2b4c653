use std::sync::Arc;

use crate::interview::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the process-wide circuit breaker; dropped when the server stops.
    pub pipeline: Arc<Pipeline>,
}
