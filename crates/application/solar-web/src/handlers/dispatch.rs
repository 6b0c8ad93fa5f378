//! `POST /functions/send-quote-email`: turns a lead into one notification email.
//!
//! Callable from any origin; [`cors_layer`] answers the `OPTIONS` preflight.
//! The bearer credential must match the public key when one is configured.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use solar_core::QuoteRequestPayload;
use solar_mail::RelayError;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use crate::state::AppState;

const PROCESS_FAILED: &str = "Failed to process quote request";

/// Any origin may call the endpoint with the headers browser clients send.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn bearer_matches(headers: &HeaderMap, public_key: &str) -> bool {
    if public_key.is_empty() {
        return true;
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == public_key)
}

pub async fn send_quote_email(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !bearer_matches(&headers, &state.public_key) {
        warn!("dispatch request with missing or wrong bearer credential");
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({ "error": "Invalid or missing authorization" }),
        );
    }

    let lead: QuoteRequestPayload = match serde_json::from_slice(&body) {
        Ok(lead) => lead,
        Err(e) => {
            error!(error = %e, "malformed dispatch body");
            return reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": PROCESS_FAILED, "message": e.to_string() }),
            );
        }
    };

    match state.relay.relay(&lead).await {
        Ok(()) => reply(
            StatusCode::OK,
            json!({ "success": true, "message": "Quote request sent successfully" }),
        ),
        Err(RelayError::NotConfigured) => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Email service not configured. Please contact support." }),
        ),
        Err(RelayError::Delivery(_)) => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": PROCESS_FAILED, "message": "Failed to send email" }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_check() {
        let mut headers = HeaderMap::new();
        assert!(bearer_matches(&headers, ""));
        assert!(!bearer_matches(&headers, "anon"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer anon"));
        assert!(bearer_matches(&headers, "anon"));
        assert!(!bearer_matches(&headers, "other"));
    }
}
