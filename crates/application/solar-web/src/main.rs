//! Solar Directory server
//!
//! ## Usage
//!
//! ```bash
//! solar-web                                   # in-process store on 127.0.0.1:3000
//! solar-web --seed installers.json \
//!     --admin-email admin@example.com --admin-password secret
//! SUPABASE_URL=https://x.supabase.co SUPABASE_ANON_KEY=... solar-web
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use solar_config::Config;
use solar_session::spawn_reaper;
use solar_web::{routes, serve, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const REAP_INTERVAL: Duration = Duration::from_secs(60);

const DEFAULT_FILTER: &str = "solar_web=info,solar_directory=info,solar_store=info,\
solar_session=info,solar_mail=info,tower_http=info";

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_json);

    let addr = config.bind;
    let state = Arc::new(
        AppState::from_config(config)
            .await
            .context("failed to start solar directory")?,
    );

    let _reaper = spawn_reaper(state.auth.clone(), REAP_INTERVAL);

    routes::print_routes();
    serve(state, addr).await.context("server error")?;
    Ok(())
}
