//! Live session table and change broadcast.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, Stream};
use solar_core::{Session, SessionEvent};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

const EVENT_CAPACITY: usize = 64;

/// Random 32-byte hex token.
pub fn generate_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    hex::encode(bytes)
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    events: broadcast::Sender<SessionEvent>,
    subscribers: Arc<AtomicUsize>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            events,
            subscribers: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn publish(&self, event: SessionEvent) {
        // no receivers is fine
        let _ = self.events.send(event);
    }

    /// Record a fresh sign-in and announce it.
    pub async fn insert(&self, session: Session) {
        self.remember(session.clone()).await;
        self.publish(SessionEvent::SignedIn(session));
    }

    /// Record a session discovered by lookup, without announcing it.
    pub async fn remember(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.access_token.clone(), session);
    }

    /// Re-key a renewed session under its new token and announce the change.
    pub async fn rotate(&self, previous: &str, session: Session) {
        {
            let mut sessions = self.sessions.write().await;
            sessions.remove(previous);
            sessions.insert(session.access_token.clone(), session.clone());
        }
        self.publish(SessionEvent::Refreshed {
            previous: previous.to_string(),
            session,
        });
    }

    /// The stored session for `token`, expired or not.
    pub async fn get(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// The stored session for `token` if it has not expired.
    pub async fn get_valid(&self, token: &str) -> Option<Session> {
        self.get(token).await.filter(Session::is_valid)
    }

    /// Forget `token` and announce the sign-out. Returns whether it was known.
    pub async fn remove(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token).is_some();
        self.publish(SessionEvent::SignedOut {
            access_token: token.to_string(),
        });
        removed
    }

    pub async fn reap_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = {
            let mut sessions = self.sessions.write().await;
            let expired: Vec<String> = sessions
                .values()
                .filter(|s| !s.is_valid_at(now))
                .map(|s| s.access_token.clone())
                .collect();
            for token in &expired {
                sessions.remove(token);
            }
            expired
        };
        for token in &expired {
            self.publish(SessionEvent::Expired {
                access_token: token.clone(),
            });
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        let count = self.subscribers.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(subscribers = count, "session subscription opened");
        SessionSubscription {
            receiver: self.events.subscribe(),
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }
}

/// A registration for session-change events. Dropping it deregisters.
pub struct SessionSubscription {
    receiver: broadcast::Receiver<SessionEvent>,
    subscribers: Arc<AtomicUsize>,
}

impl SessionSubscription {
    /// Next event; `None` once the registry is gone. Missed events are skipped.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "session subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = SessionEvent> + Send + 'static {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .recv()
                .await
                .map(|event| (event, subscription))
        })
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        let remaining = self.subscribers.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(subscribers = remaining, "session subscription closed");
    }
}
