//! In-process credential table.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::registry::{generate_token, SessionRegistry, SessionSubscription};
use crate::{AuthError, AuthProvider, Result, Session};

/// Hash a password with salt
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Stored hashed.
#[derive(Debug, Clone)]
struct Credentials {
    user_id: String,
    email: String,
    password_hash: String,
    salt: String,
}

impl Credentials {
    fn new(email: &str, password: &str) -> Self {
        use rand::Rng;
        let salt_bytes: [u8; 16] = rand::thread_rng().gen();
        let salt = hex::encode(salt_bytes);
        Self {
            user_id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: hash_password(password, &salt),
            salt,
        }
    }

    fn verify(&self, password: &str) -> bool {
        hash_password(password, &self.salt) == self.password_hash
    }
}

pub struct LocalAuth {
    registry: SessionRegistry,
    users: HashMap<String, Credentials>,
    session_hours: i64,
}

impl LocalAuth {
    pub fn new(session_hours: i64) -> Self {
        Self {
            registry: SessionRegistry::new(),
            users: HashMap::new(),
            session_hours,
        }
    }

    /// Add an admin login. Emails are matched case-insensitively.
    pub fn with_user(mut self, email: &str, password: &str) -> Self {
        let email = email.trim();
        self.users
            .insert(email.to_lowercase(), Credentials::new(email, password));
        self
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        Ok(self.registry.get_valid(token).await)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let Some(creds) = self.users.get(&email.trim().to_lowercase()) else {
            warn!("sign-in for unknown admin");
            return Err(AuthError::InvalidCredentials);
        };
        if !creds.verify(password) {
            warn!(email = %creds.email, "admin sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            access_token: generate_token(),
            user_id: creds.user_id.clone(),
            email: creds.email.clone(),
            expires_at: Utc::now() + Duration::hours(self.session_hours),
        };
        self.registry.insert(session.clone()).await;
        info!(email = %session.email, "admin signed in");
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        if self.registry.remove(token).await {
            info!("admin signed out");
        }
        Ok(())
    }

    fn subscribe(&self) -> SessionSubscription {
        self.registry.subscribe()
    }

    async fn reap_expired(&self) -> usize {
        self.registry.reap_expired().await
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_core::SessionEvent;

    fn auth() -> LocalAuth {
        LocalAuth::new(24).with_user("Admin@Example.com", "sunshine")
    }

    #[test]
    fn hash_is_salted() {
        assert_ne!(hash_password("pw", "a"), hash_password("pw", "b"));
        assert_eq!(hash_password("pw", "a"), hash_password("pw", "a"));
    }

    #[tokio::test]
    async fn sign_in_issues_valid_session() {
        let auth = auth();
        let session = auth.sign_in("admin@example.com ", "sunshine").await.unwrap();
        assert_eq!(session.email, "Admin@Example.com");
        assert!(session.is_valid());
        assert_eq!(
            auth.get_session(&session.access_token).await.unwrap(),
            Some(session)
        );
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = auth();
        assert!(matches!(
            auth.sign_in("admin@example.com", "moonlight").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("nobody@example.com", "sunshine").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn sign_out_ends_session_and_notifies() {
        let auth = auth();
        let session = auth.sign_in("admin@example.com", "sunshine").await.unwrap();
        let mut events = auth.subscribe();

        tokio_test::assert_ok!(auth.sign_out(&session.access_token).await);

        assert_eq!(auth.get_session(&session.access_token).await.unwrap(), None);
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::SignedOut {
                access_token: session.access_token
            })
        );
    }

    #[tokio::test]
    async fn zero_hour_sessions_expire_immediately() {
        let auth = LocalAuth::new(0).with_user("a@example.com", "pw");
        let session = auth.sign_in("a@example.com", "pw").await.unwrap();
        assert_eq!(auth.get_session(&session.access_token).await.unwrap(), None);
        assert_eq!(auth.reap_expired().await, 1);
    }
}
