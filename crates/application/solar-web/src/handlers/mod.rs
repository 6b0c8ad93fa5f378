//! Route handlers

pub mod admin;
pub mod dispatch;
pub mod health;
pub mod lead;
pub mod listing;

use axum::http::HeaderMap;
use axum::response::Html;
use solar_core::{AdminGate, Session};
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::state::AppState;
use crate::templates::{page, PageMode};

pub const SESSION_COOKIE: &str = "solar_session";

/// Check if the request comes from HTMX (has HX-Request header).
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}

/// Bare fragment for HTMX swaps, full document for direct loads.
pub fn render(headers: &HeaderMap, mode: PageMode, fragment: String) -> Html<String> {
    if is_htmx(headers) {
        Html(fragment)
    } else {
        Html(page(mode, &fragment))
    }
}

pub fn session_cookie(access_token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, access_token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// Session named by the cookie. Lookup failures count as signed out.
/// A session renewed under a new token gets its cookie re-issued.
pub async fn current_session(state: &AppState, cookies: &Cookies) -> Option<Session> {
    let token = cookies.get(SESSION_COOKIE)?.value().to_string();
    let gate = AdminGate::from_check(state.auth.get_session(&token).await);
    let session = gate.session().cloned()?;
    if session.access_token != token {
        cookies.add(session_cookie(session.access_token.clone()));
    }
    Some(session)
}
