//! Health check handler.

use axum::Json;
use serde_json::{Value, json};

/// Health check endpoint.
pub async fn health() -> Json<Value> {
    Json(json!({ "message": "Server is up and running" }))
}
