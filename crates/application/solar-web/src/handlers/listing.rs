use std::sync::Arc;

use axum::extract::{Query, RawQuery, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use solar_core::LeadDraft;
use solar_directory::ConsoleTab;
use tower_cookies::Cookies;

use super::{admin, current_session};
use crate::state::AppState;
use crate::templates::lead::quote_form;
use crate::templates::listing::{listing_results, listing_shell};
use crate::templates::{page, PageMode};

/// The `admin` flag and console tab carried by the document URL.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub admin: bool,
    pub tab: ConsoleTab,
}

impl PageQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "admin" => parsed.admin = true,
                "tab" => parsed.tab = ConsoleTab::from_query(Some(value.as_ref())),
                _ => {}
            }
        }
        parsed
    }
}

/// `/` renders the listing, or the admin console when `admin` is present.
pub async fn index(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = PageQuery::parse(raw.as_deref());
    if !query.admin {
        return Html(page(PageMode::Listing, &listing_shell())).into_response();
    }

    let content = match current_session(&state, &cookies).await {
        Some(session) => {
            let panel = admin::render_panel(&state, &session, query.tab, None, None).await;
            crate::templates::admin::console(&session, &panel)
        }
        None => crate::templates::admin::login_gate("", None),
    };
    Html(page(PageMode::Admin, &content)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub q: String,
    pub activate: Option<String>,
}

/// Results region. `activate` re-fetches; keystrokes filter the held list.
pub async fn listing_partial(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingParams>,
) -> impl IntoResponse {
    if params.activate.is_some() {
        state.listing.refresh().await;
    }
    let snapshot = state.listing.snapshot().await;
    let form = quote_form(&LeadDraft::default(), None);
    Html(listing_results(
        &snapshot.layout(&params.q),
        snapshot.loading,
        &form,
    ))
}

pub async fn quote_form_partial(headers: HeaderMap) -> impl IntoResponse {
    super::render(
        &headers,
        PageMode::Listing,
        quote_form(&LeadDraft::default(), None),
    )
}
