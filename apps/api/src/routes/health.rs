use axum::Json;
use serde_json::{json, Value};

/// GET /api/health
/// Static liveness probe; never touches the provider or the breaker.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
