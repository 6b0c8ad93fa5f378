//! Server configuration.
//!
//! Every flag can also be set from the environment, so a deployment only
//! needs the same variables the hosted frontend was built with.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use solar_core::split_labels;
use thiserror::Error;
use url::Url;

pub const DEFAULT_EMAIL_FROM: &str = "Solar Quotes <noreply@yourdomain.com>";
pub const DEFAULT_EMAIL_TO: &str = "Michiguns2024@gmail.com";
pub const DISPATCH_PATH: &str = "/functions/send-quote-email";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{flag} is not a valid URL: {source}")]
    InvalidUrl {
        flag: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{0} requires --data-store-key")]
    MissingKey(&'static str),

    #[error("--email-to lists no recipients")]
    NoRecipients,

    #[error("--session-hours must be at least 1")]
    SessionHours,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Parser, Debug, Clone)]
#[command(name = "solar-web")]
#[command(about = "Ann Arbor solar installer directory")]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "SOLAR_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Hosted data store base URL; absent runs the in-process store
    #[arg(long, env = "SUPABASE_URL")]
    pub data_store_url: Option<String>,

    /// Public API key for the data store and the dispatch endpoint
    #[arg(long, env = "SUPABASE_ANON_KEY")]
    pub data_store_key: Option<String>,

    /// Where lead notifications are posted
    #[arg(long, env = "SOLAR_DISPATCH_URL")]
    pub dispatch_url: Option<String>,

    /// Upstream transactional email credential
    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    #[arg(long, env = "SOLAR_EMAIL_FROM", default_value = DEFAULT_EMAIL_FROM)]
    pub email_from: String,

    /// Comma-separated recipient list
    #[arg(long, env = "SOLAR_EMAIL_TO", default_value = DEFAULT_EMAIL_TO)]
    pub email_to: String,

    /// Admin login for the in-process auth provider
    #[arg(long, env = "SOLAR_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    #[arg(long, env = "SOLAR_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Session lifetime for the in-process auth provider
    #[arg(long, env = "SOLAR_SESSION_HOURS", default_value_t = 24)]
    pub session_hours: i64,

    /// JSON file of installers loaded into the in-process store
    #[arg(long, env = "SOLAR_SEED")]
    pub seed: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Config {
    /// Endpoint the lead form notifies. Defaults to this server's own relay.
    pub fn dispatch_url(&self) -> String {
        self.dispatch_url
            .clone()
            .unwrap_or_else(|| format!("http://{}{}", self.bind, DISPATCH_PATH))
    }

    pub fn email_recipients(&self) -> Vec<String> {
        split_labels(&self.email_to)
    }

    pub fn uses_hosted_backend(&self) -> bool {
        self.data_store_url.is_some()
    }

    /// Public key sent as bearer credential; empty when none is configured.
    pub fn public_key(&self) -> &str {
        self.data_store_key.as_deref().unwrap_or_default()
    }

    pub fn has_local_admin(&self) -> bool {
        self.admin_email.is_some() && self.admin_password.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(raw) = &self.data_store_url {
            Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
                flag: "--data-store-url",
                source,
            })?;
            if self.data_store_key.is_none() {
                return Err(ConfigError::MissingKey("--data-store-url"));
            }
        }
        Url::parse(&self.dispatch_url()).map_err(|source| ConfigError::InvalidUrl {
            flag: "--dispatch-url",
            source,
        })?;
        if self.email_recipients().is_empty() {
            return Err(ConfigError::NoRecipients);
        }
        if self.session_hours < 1 {
            return Err(ConfigError::SessionHours);
        }
        if !self.uses_hosted_backend() && !self.has_local_admin() {
            tracing::warn!("no admin credentials configured; the admin console cannot be signed into");
        }
        Ok(())
    }
}
