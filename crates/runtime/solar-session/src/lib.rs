//! Solar Session
//!
//! Admin authentication behind one trait:
//!
//! - [`LocalAuth`]: salted credential table held in process
//! - [`GoTrueAuth`]: password grant against a hosted auth service
//!
//! Both keep live sessions in a [`SessionRegistry`], which broadcasts
//! [`SessionEvent`]s to every open [`SessionSubscription`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub use solar_core::{Session, SessionEvent};

pub mod gotrue;
pub mod local;
pub mod registry;

pub use gotrue::GoTrueAuth;
pub use local::LocalAuth;
pub use registry::{SessionRegistry, SessionSubscription};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("auth request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth service answered {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("could not decode auth response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Session authority consulted by the admin console.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The live session for `token`, if any. Expired sessions are `None`.
    async fn get_session(&self, token: &str) -> Result<Option<Session>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_out(&self, token: &str) -> Result<()>;

    /// Register for session-change events until the subscription is dropped.
    fn subscribe(&self) -> SessionSubscription;

    /// Drop expired sessions, publishing `Expired` for each. Returns how many.
    async fn reap_expired(&self) -> usize;

    fn name(&self) -> &'static str;
}

/// Periodically reap expired sessions.
pub fn spawn_reaper(auth: Arc<dyn AuthProvider>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let reaped = auth.reap_expired().await;
            if reaped > 0 {
                info!(reaped, provider = auth.name(), "expired admin sessions");
            } else {
                debug!(provider = auth.name(), "no sessions to reap");
            }
        }
    })
}
