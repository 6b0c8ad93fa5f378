//! Solar Directory web front end
//!
//! Server-rendered HTML with HTMX swaps:
//!
//! - **Listing**: ranked installer cards with a live text filter and the quote form
//! - **Admin console**: `/?admin`, gated by an auth-provider session cookie
//! - **Dispatch endpoint**: `POST /functions/send-quote-email`, relays leads to email

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

pub use state::{AppState, StartupError};

/// Create the main router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/", get(handlers::listing::index))
        .route("/partials/listing", get(handlers::listing::listing_partial))
        .route(
            "/partials/quote-form",
            get(handlers::listing::quote_form_partial),
        )
        .route("/quote", post(handlers::lead::submit_quote))
        .route("/admin/login", post(handlers::admin::login))
        .route("/admin/logout", post(handlers::admin::logout))
        .route("/api/health", get(handlers::health::health))
        .route(
            solar_config::DISPATCH_PATH,
            post(handlers::dispatch::send_quote_email).layer(handlers::dispatch::cors_layer()),
        );

    // Admin routes (live session required)
    let admin_routes = Router::new()
        .route("/admin/panel", get(handlers::admin::panel))
        .route("/admin/installers/new", get(handlers::admin::new_installer))
        .route("/admin/installers", post(handlers::admin::create_installer))
        .route(
            "/admin/installers/{id}/edit",
            get(handlers::admin::edit_installer),
        )
        .route(
            "/admin/installers/{id}",
            post(handlers::admin::update_installer),
        )
        .route(
            "/admin/installers/{id}/delete",
            get(handlers::admin::confirm_installer_delete).post(handlers::admin::delete_installer),
        )
        .route(
            "/admin/quotes/{id}/delete",
            get(handlers::admin::confirm_quote_delete).post(handlers::admin::delete_quote),
        )
        .route(
            "/admin/session-events",
            get(handlers::admin::session_events),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("solar directory listening on http://{}", addr);

    axum::serve(listener, app).await
}
