//! API middleware.

use axum::Json;
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::error::REDACTED_MESSAGE;

/// Create CORS layer.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(600));

    if origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Replace the body of every 500 response with a generic message.
///
/// Installed in production only; details are still logged where the error
/// was raised.
pub async fn redact_internal_errors(request: Request<Body>, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::INTERNAL_SERVER_ERROR {
        return response;
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": REDACTED_MESSAGE })),
    )
        .into_response()
}
