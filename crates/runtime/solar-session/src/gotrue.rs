//! Hosted auth service (GoTrue REST API).

use std::collections::HashMap;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::registry::{SessionRegistry, SessionSubscription};
use crate::{AuthError, AuthProvider, Result, Session};

const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Lifetime assumed for a token found by lookup rather than issued here.
const LOOKUP_TTL_SECS: i64 = 3600;

/// Sessions this close to expiry are renewed with their refresh token.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, fallback_email: &str) -> (Session, Option<String>) {
        let session = Session {
            access_token: self.access_token,
            user_id: self.user.id,
            email: self
                .user
                .email
                .unwrap_or_else(|| fallback_email.to_string()),
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
        };
        (session, self.refresh_token)
    }
}

/// Refresh tokens for sessions issued here, keyed by current access token, and
/// the access tokens that renewals replaced.
#[derive(Debug, Default)]
struct Grants {
    refresh: HashMap<String, String>,
    replaced: HashMap<String, String>,
}

impl Grants {
    /// Follows a replaced token to the one now in use.
    fn current(&self, token: &str) -> String {
        self.replaced
            .get(token)
            .cloned()
            .unwrap_or_else(|| token.to_string())
    }

    fn rotate(&mut self, previous: &str, next: &str, refresh_token: Option<String>) {
        let kept = self.refresh.remove(previous);
        if let Some(refresh_token) = refresh_token.or(kept) {
            self.refresh.insert(next.to_string(), refresh_token);
        }
        for current in self.replaced.values_mut() {
            if current.as_str() == previous {
                *current = next.to_string();
            }
        }
        self.replaced.insert(previous.to_string(), next.to_string());
    }

    fn forget(&mut self, token: &str) {
        self.refresh.remove(token);
        self.replaced
            .retain(|old, current| old.as_str() != token && current.as_str() != token);
    }
}

fn due_for_refresh(session: &Session, now: DateTime<Utc>) -> bool {
    session.expires_at - now <= Duration::seconds(REFRESH_MARGIN_SECS)
}

pub struct GoTrueAuth {
    client: Client,
    base_url: String,
    api_key: String,
    registry: SessionRegistry,
    grants: Mutex<Grants>,
    /// One renewal at a time, so a refresh token is never spent twice.
    refreshing: Mutex<()>,
}

impl GoTrueAuth {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            registry: SessionRegistry::new(),
            grants: Mutex::new(Grants::default()),
            refreshing: Mutex::new(()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn body(response: Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(AuthError::Upstream {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// `POST /token` with the given grant. `None` when the service refuses it.
    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<Option<TokenResponse>> {
        let response = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&Self::body(response).await?)?))
    }

    /// Renew `session` with its refresh token, re-keying it under the new access
    /// token. `None` when there is no refresh token or it was refused.
    async fn refresh(&self, session: &Session) -> Result<Option<Session>> {
        let _one_at_a_time = self.refreshing.lock().await;

        let (current, refresh_token) = {
            let grants = self.grants.lock().await;
            let current = grants.current(&session.access_token);
            let refresh_token = grants.refresh.get(&current).cloned();
            (current, refresh_token)
        };
        if current != session.access_token {
            return Ok(self.registry.get_valid(&current).await);
        }
        let Some(refresh_token) = refresh_token else {
            return Ok(None);
        };

        let granted = self
            .token_grant(
                "refresh_token",
                serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await?;
        let Some(token) = granted else {
            warn!(email = %session.email, "refresh token refused by auth service");
            self.grants.lock().await.forget(&session.access_token);
            return Ok(None);
        };

        let (renewed, next_refresh) = token.into_session(&session.email);
        self.grants
            .lock()
            .await
            .rotate(&session.access_token, &renewed.access_token, next_refresh);
        self.registry
            .rotate(&session.access_token, renewed.clone())
            .await;
        info!(email = %renewed.email, "admin session refreshed");
        Ok(Some(renewed))
    }

    /// The cached session, renewed first when it is close to expiry.
    async fn renewed(&self, session: Session) -> Option<Session> {
        if !due_for_refresh(&session, Utc::now()) {
            return Some(session);
        }
        match self.refresh(&session).await {
            Ok(Some(renewed)) => return Some(renewed),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "session refresh failed"),
        }
        Some(session).filter(Session::is_valid)
    }
}

#[async_trait]
impl AuthProvider for GoTrueAuth {
    async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let token = self.grants.lock().await.current(token);
        if let Some(session) = self.registry.get(&token).await {
            return Ok(self.renewed(session).await);
        }

        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(&token)
            .send()
            .await?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }
        let user: User = serde_json::from_str(&Self::body(response).await?)?;

        let session = Session {
            access_token: token,
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            expires_at: Utc::now() + Duration::seconds(LOOKUP_TTL_SECS),
        };
        self.registry.remember(session.clone()).await;
        Ok(Some(session))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let granted = self
            .token_grant(
                "password",
                serde_json::json!({ "email": email.trim(), "password": password }),
            )
            .await?;
        let Some(token) = granted else {
            warn!("admin sign-in rejected by auth service");
            return Err(AuthError::InvalidCredentials);
        };

        let (session, refresh_token) = token.into_session(email.trim());
        if let Some(refresh_token) = refresh_token {
            self.grants
                .lock()
                .await
                .refresh
                .insert(session.access_token.clone(), refresh_token);
        }
        self.registry.insert(session.clone()).await;
        info!(email = %session.email, "admin signed in");
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        let token = {
            let mut grants = self.grants.lock().await;
            let current = grants.current(token);
            grants.forget(&current);
            current
        };
        self.registry.remove(&token).await;
        let outcome = self
            .client
            .post(self.url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(&token)
            .send()
            .await;
        match outcome {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!(status = %response.status(), "remote sign-out refused"),
            Err(e) => warn!(error = %e, "remote sign-out failed"),
        }
        Ok(())
    }

    fn subscribe(&self) -> SessionSubscription {
        self.registry.subscribe()
    }

    /// Renews sessions that hold a refresh token before reaping, so an idle
    /// console stays signed in for as long as the auth service allows.
    async fn reap_expired(&self) -> usize {
        let refreshable: Vec<String> = self.grants.lock().await.refresh.keys().cloned().collect();
        let now = Utc::now();
        for token in refreshable {
            let Some(session) = self.registry.get(&token).await else {
                continue;
            };
            if due_for_refresh(&session, now) {
                if let Err(e) = self.refresh(&session).await {
                    warn!(error = %e, "session refresh failed");
                }
            }
        }

        let reaped = self.registry.reap_expired().await;

        let mut grants = self.grants.lock().await;
        let tracked: Vec<String> = grants.refresh.keys().cloned().collect();
        for token in tracked {
            if self.registry.get(&token).await.is_none() {
                debug!("dropping refresh token for a reaped session");
                grants.forget(&token);
            }
        }
        reaped
    }

    fn name(&self) -> &'static str {
        "gotrue"
    }
}
