use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use solar_core::{Banner, LeadDraft};
use solar_directory::lead::SUBMIT_FAILED;
use solar_directory::Error;

use super::render;
use crate::state::AppState;
use crate::templates::lead::{quote_form, quote_thanks};
use crate::templates::PageMode;

/// Store the quote request, then show the confirmation. A rejected draft comes
/// back filled in, with a banner.
pub async fn submit_quote(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(draft): Form<LeadDraft>,
) -> impl IntoResponse {
    let fragment = match state.leads.submit(&draft).await {
        Ok(_) => quote_thanks(),
        Err(Error::Invalid(e)) => quote_form(
            &draft,
            Some(&Banner::error(format!("Please check the form: {e}."))),
        ),
        Err(_) => quote_form(&draft, Some(&Banner::error(SUBMIT_FAILED))),
    };
    render(&headers, PageMode::Listing, fragment)
}
