//! Application state shared by every handler.

use std::sync::Arc;

use solar_config::{Config, ConfigError};
use solar_directory::{AdminConsole, LeadCapture, ListingView};
use solar_mail::{DispatchClient, LeadNotifier, MailError, Mailer, Relay, ResendMailer};
use solar_session::{AuthError, AuthProvider, GoTrueAuth, LocalAuth};
use solar_store::{DataStore, InstallerRepo, MemoryStore, QuoteRequestRepo, RestStore, StoreError};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("data store: {0}")]
    Store(#[from] StoreError),

    #[error("auth provider: {0}")]
    Auth(#[from] AuthError),

    #[error("mail client: {0}")]
    Mail(#[from] MailError),
}

pub struct AppState {
    pub config: Config,
    pub auth: Arc<dyn AuthProvider>,
    pub listing: Arc<ListingView>,
    pub leads: LeadCapture,
    pub console: AdminConsole,
    pub relay: Relay,
    pub store_backend: &'static str,
    /// Bearer credential the dispatch endpoint accepts. Empty accepts any caller.
    pub public_key: String,
}

impl AppState {
    /// Wire the collaborators named by `config`.
    pub async fn from_config(config: Config) -> Result<Self, StartupError> {
        config.validate()?;

        let (store, auth): (Arc<dyn DataStore>, Arc<dyn AuthProvider>) =
            match &config.data_store_url {
                Some(url) => {
                    let key = config.public_key();
                    info!(url = %url, "using hosted data store and auth");
                    (
                        Arc::new(RestStore::new(url, key)?),
                        Arc::new(GoTrueAuth::new(url, key)?),
                    )
                }
                None => {
                    let memory = MemoryStore::new();
                    if let Some(seed) = &config.seed {
                        memory.seed_from(seed).await?;
                    }
                    let mut local = LocalAuth::new(config.session_hours);
                    if let (Some(email), Some(password)) =
                        (&config.admin_email, &config.admin_password)
                    {
                        local = local.with_user(email, password);
                    }
                    info!(admins = local.user_count(), "using in-process data store and auth");
                    (Arc::new(memory), Arc::new(local))
                }
            };

        let notifier = Arc::new(DispatchClient::new(
            &config.dispatch_url(),
            config.public_key(),
        )?);
        let mailer = match &config.resend_api_key {
            Some(key) => Some(Arc::new(ResendMailer::new(key)?) as Arc<dyn Mailer>),
            None => None,
        };

        Ok(Self::assemble(config, store, auth, notifier, mailer))
    }

    /// Build state from already-constructed collaborators.
    pub fn assemble(
        config: Config,
        store: Arc<dyn DataStore>,
        auth: Arc<dyn AuthProvider>,
        notifier: Arc<dyn LeadNotifier>,
        mailer: Option<Arc<dyn Mailer>>,
    ) -> Self {
        let store_backend = store.backend();
        let listing = Arc::new(ListingView::new(InstallerRepo::new(store.clone())));
        let leads = LeadCapture::new(QuoteRequestRepo::new(store.clone()), notifier);
        let console = AdminConsole::new(store, listing.clone());
        let relay = Relay::new(mailer, &config.email_from, config.email_recipients());
        let public_key = config.public_key().to_string();

        Self {
            config,
            auth,
            listing,
            leads,
            console,
            relay,
            store_backend,
            public_key,
        }
    }
}
