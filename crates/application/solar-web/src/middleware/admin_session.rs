//! Admin session gate.
//!
//! Resolves the `solar_session` cookie through the auth provider on every
//! request. A live [`Session`](solar_core::Session) is injected into request
//! extensions; anything else (no cookie, expired, provider error) is treated as
//! signed out.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tower_cookies::Cookies;
use tracing::debug;

use crate::handlers::{current_session, is_htmx};
use crate::state::AppState;

const LOGIN_URL: &str = "/?admin";

pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    match current_session(&state, &cookies).await {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => {
            debug!(path = %request.uri().path(), "admin route without a live session");
            signed_out(request.headers())
        }
    }
}

/// Send the browser back to the login gate. HTMX requests get `HX-Redirect`
/// so the whole document reloads instead of a fragment swap.
pub fn signed_out(headers: &HeaderMap) -> Response {
    if is_htmx(headers) {
        (StatusCode::UNAUTHORIZED, [("HX-Redirect", LOGIN_URL)]).into_response()
    } else {
        Redirect::to(LOGIN_URL).into_response()
    }
}
