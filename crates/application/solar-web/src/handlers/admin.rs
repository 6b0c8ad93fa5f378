//! Admin console: sign-in, installer CRUD, quote-request review and the
//! session-change stream.
//!
//! Everything below `login`/`logout` runs behind
//! [`require_admin`](crate::middleware::require_admin), which puts the
//! caller's [`Session`] into request extensions.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Extension, Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Redirect, Response};
use futures::future;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use solar_core::{AdminGate, Banner, InstallerForm, Session};
use solar_directory::{Action, Confirmation, ConsoleTab, Error};
use solar_session::AuthError;
use tower_cookies::{Cookie, Cookies};
use tracing::{debug, info, warn};

use super::{is_htmx, session_cookie, SESSION_COOKIE};
use crate::middleware::signed_out;
use crate::state::AppState;
use crate::templates::admin::{
    confirm_delete, console, console_panel, login_gate, FormState, PanelView, INVALID_LOGIN,
    LOGIN_UNAVAILABLE,
};
use crate::templates::{page, PageMode};

pub const SESSION_LOST_EVENT: &str = "session-lost";

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Form(input): Form<LoginInput>,
) -> Response {
    match state.auth.sign_in(input.email.trim(), &input.password).await {
        Ok(session) => {
            info!(email = %session.email, "admin signed in");
            cookies.add(session_cookie(session.access_token));
            Redirect::to("/?admin").into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            debug!(email = %input.email, "login gate rejected credentials");
            (
                StatusCode::UNAUTHORIZED,
                Html(page(
                    PageMode::Admin,
                    &login_gate(&input.email, Some(INVALID_LOGIN)),
                )),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "admin sign-in failed");
            (
                StatusCode::BAD_GATEWAY,
                Html(page(
                    PageMode::Admin,
                    &login_gate(&input.email, Some(LOGIN_UNAVAILABLE)),
                )),
            )
                .into_response()
        }
    }
}

pub async fn logout(State(state): State<Arc<AppState>>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        if let Err(e) = state.auth.sign_out(cookie.value()).await {
            warn!(error = %e, "sign-out failed");
        }
        let mut removal = Cookie::from(SESSION_COOKIE);
        removal.set_path("/");
        cookies.remove(removal);
    }
    Redirect::to("/?admin")
}

/// Panel contents for `tab`, fetched fresh.
pub async fn render_panel(
    state: &AppState,
    session: &Session,
    tab: ConsoleTab,
    form: Option<(&InstallerForm, Option<&str>)>,
    banner: Option<&Banner>,
) -> String {
    let installers = state.console.installers(session).await;
    let quotes = state.console.quote_requests(session).await;
    console_panel(&PanelView {
        tab,
        installers: &installers,
        quotes: &quotes,
        form: form.map(|(form, editing)| FormState { form, editing }),
        banner,
    })
}

/// Panel fragment for HTMX, or the whole console for a direct load.
fn panel_response(headers: &HeaderMap, session: &Session, panel: String) -> Html<String> {
    if is_htmx(headers) {
        Html(panel)
    } else {
        Html(page(PageMode::Admin, &console(session, &panel)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TabQuery {
    pub tab: Option<String>,
}

pub async fn panel(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<TabQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let tab = ConsoleTab::from_query(query.tab.as_deref());
    let html = render_panel(&state, &session, tab, None, None).await;
    panel_response(&headers, &session, html)
}

pub async fn new_installer(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
) -> Html<String> {
    let form = InstallerForm::blank();
    let html = render_panel(
        &state,
        &session,
        ConsoleTab::Installers,
        Some((&form, None)),
        None,
    )
    .await;
    panel_response(&headers, &session, html)
}

pub async fn edit_installer(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Html<String> {
    let html = match state.console.edit_form(&session, &id).await {
        Some(form) => {
            render_panel(
                &state,
                &session,
                ConsoleTab::Installers,
                Some((&form, Some(id.as_str()))),
                None,
            )
            .await
        }
        None => {
            let notice = Banner::error("That installer no longer exists.");
            render_panel(&state, &session, ConsoleTab::Installers, None, Some(&notice)).await
        }
    };
    panel_response(&headers, &session, html)
}

async fn save(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    id: Option<&str>,
    form: InstallerForm,
) -> Response {
    let action = if id.is_some() {
        Action::UpdateInstaller
    } else {
        Action::AddInstaller
    };
    let html = match state.console.save_installer(session, id, &form).await {
        Ok(notice) => {
            render_panel(state, session, ConsoleTab::Installers, None, Some(&notice)).await
        }
        Err(Error::NotSignedIn) => return signed_out(headers),
        Err(e) => {
            let notice = e.banner_for(action);
            render_panel(
                state,
                session,
                ConsoleTab::Installers,
                Some((&form, id)),
                Some(&notice),
            )
            .await
        }
    };
    panel_response(headers, session, html).into_response()
}

pub async fn create_installer(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Form(form): Form<InstallerForm>,
) -> Response {
    save(&state, &session, &headers, None, form).await
}

pub async fn update_installer(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<InstallerForm>,
) -> Response {
    save(&state, &session, &headers, Some(&id), form).await
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmInput {
    pub confirm: Option<String>,
}

pub async fn confirm_installer_delete(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Html<String> {
    let subject = state
        .console
        .installers(&session)
        .await
        .into_iter()
        .find(|installer| installer.id == id)
        .map(|installer| installer.name)
        .unwrap_or_else(|| id.clone());
    let prompt = Action::DeleteInstaller
        .confirmation_prompt()
        .unwrap_or_default();
    let html = confirm_delete(
        prompt,
        &subject,
        &format!("/admin/installers/{id}/delete"),
        ConsoleTab::Installers,
    );
    panel_response(&headers, &session, html)
}

pub async fn confirm_quote_delete(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Html<String> {
    let subject = state
        .console
        .quote_requests(&session)
        .await
        .into_iter()
        .find(|quote| quote.id == id)
        .map(|quote| quote.name)
        .unwrap_or_else(|| id.clone());
    let prompt = Action::DeleteQuoteRequest
        .confirmation_prompt()
        .unwrap_or_default();
    let html = confirm_delete(
        prompt,
        &subject,
        &format!("/admin/quotes/{id}/delete"),
        ConsoleTab::Quotes,
    );
    panel_response(&headers, &session, html)
}

async fn after_delete(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    tab: ConsoleTab,
    action: Action,
    outcome: solar_directory::Result<Banner>,
) -> Response {
    let notice = match outcome {
        Ok(notice) => Some(notice),
        Err(Error::NotConfirmed) => None,
        Err(Error::NotSignedIn) => return signed_out(headers),
        Err(e) => Some(e.banner_for(action)),
    };
    let html = render_panel(state, session, tab, None, notice.as_ref()).await;
    panel_response(headers, session, html).into_response()
}

pub async fn delete_installer(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(input): Form<ConfirmInput>,
) -> Response {
    let confirmation = Confirmation::from_answer(input.confirm.as_deref());
    let outcome = state
        .console
        .delete_installer(&session, &id, confirmation)
        .await;
    after_delete(
        &state,
        &session,
        &headers,
        ConsoleTab::Installers,
        Action::DeleteInstaller,
        outcome,
    )
    .await
}

pub async fn delete_quote(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(input): Form<ConfirmInput>,
) -> Response {
    let confirmation = Confirmation::from_answer(input.confirm.as_deref());
    let outcome = state
        .console
        .delete_quote_request(&session, &id, confirmation)
        .await;
    after_delete(
        &state,
        &session,
        &headers,
        ConsoleTab::Quotes,
        Action::DeleteQuoteRequest,
        outcome,
    )
    .await
}

fn session_lost() -> Result<Event, Infallible> {
    Ok(Event::default().event(SESSION_LOST_EVENT).data("signed-out"))
}

/// Emits one `session-lost` event once this browser's session is signed out or
/// expires, then ends. Renewals are followed. The subscription is released when the client goes away.
pub async fn session_events(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    let subscription = state.auth.subscribe();
    let token = session.access_token.clone();

    // Catch a sign-out that landed between the gate check and the subscribe.
    let gate = AdminGate::from_check(state.auth.get_session(&token).await);
    if !gate.is_logged_in() {
        return Sse::new(stream::once(future::ready(session_lost())).boxed()).into_response();
    }
    debug!(email = %session.email, "watching admin session");

    let events = subscription
        .into_stream()
        .scan((token, gate), |(watched, gate), event| {
            gate.apply(watched.as_str(), &event);
            // a renewal moves the session to a new token
            *watched = gate.watched_token(watched.as_str()).to_string();
            future::ready(Some(gate.is_logged_in()))
        })
        .filter(|logged_in| future::ready(!logged_in))
        .take(1)
        .map(|_| session_lost())
        .boxed();

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}
