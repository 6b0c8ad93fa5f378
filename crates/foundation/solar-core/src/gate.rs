//! Admin console gating.
//!
//! A browser is either LoggedOut or LoggedIn. The initial state comes from a
//! session lookup; later transitions come from [`SessionEvent`]s. Lookup
//! errors count as "no session".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated admin session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Session-change notification published by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    /// `previous` was renewed; the session now lives under a new access token.
    Refreshed { previous: String, session: Session },
    SignedOut { access_token: String },
    Expired { access_token: String },
}

impl SessionEvent {
    /// Token the event concerns.
    pub fn token(&self) -> &str {
        match self {
            SessionEvent::SignedIn(session) => &session.access_token,
            SessionEvent::Refreshed { previous, .. } => previous,
            SessionEvent::SignedOut { access_token } | SessionEvent::Expired { access_token } => {
                access_token
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdminGate {
    #[default]
    LoggedOut,
    LoggedIn(Session),
}

impl AdminGate {
    /// Initial state from a session lookup. Errors and expired sessions fail closed.
    pub fn from_check<E>(check: Result<Option<Session>, E>) -> Self {
        match check {
            Ok(Some(session)) if session.is_valid() => AdminGate::LoggedIn(session),
            _ => AdminGate::LoggedOut,
        }
    }

    /// Apply a session-change event for the token this gate watches.
    /// Events for other tokens leave the state untouched. The latest event wins.
    pub fn apply(&mut self, watched_token: &str, event: &SessionEvent) {
        if event.token() != watched_token {
            return;
        }
        *self = match event {
            SessionEvent::SignedIn(session) | SessionEvent::Refreshed { session, .. }
                if session.is_valid() =>
            {
                AdminGate::LoggedIn(session.clone())
            }
            _ => AdminGate::LoggedOut,
        };
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AdminGate::LoggedIn(session) => Some(session),
            AdminGate::LoggedOut => None,
        }
    }

    /// Token to watch for further events: the session's current one, or `fallback`.
    pub fn watched_token<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.session().map_or(fallback, |session| session.access_token.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, AdminGate::LoggedIn(_))
    }

    /// Mutating console calls are only possible while LoggedIn with an unexpired session.
    pub fn allows_mutation(&self) -> bool {
        self.session().is_some_and(Session::is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(token: &str) -> Session {
        Session {
            access_token: token.to_string(),
            user_id: "u-1".to_string(),
            email: "admin@example.com".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn lookup_errors_fail_closed() {
        let gate = AdminGate::from_check::<&str>(Err("auth provider unreachable"));
        assert_eq!(gate, AdminGate::LoggedOut);
        assert!(!gate.allows_mutation());

        let gate = AdminGate::from_check::<()>(Ok(None));
        assert_eq!(gate, AdminGate::LoggedOut);
    }

    #[test]
    fn expired_session_is_logged_out() {
        let mut stale = session("t1");
        stale.expires_at = Utc::now() - Duration::seconds(1);
        assert_eq!(AdminGate::from_check::<()>(Ok(Some(stale))), AdminGate::LoggedOut);
    }

    #[test]
    fn valid_session_logs_in() {
        let gate = AdminGate::from_check::<()>(Ok(Some(session("t1"))));
        assert!(gate.is_logged_in());
        assert!(gate.allows_mutation());
        assert_eq!(gate.session().map(|s| s.email.as_str()), Some("admin@example.com"));
    }

    #[test]
    fn expiry_event_logs_out() {
        let mut gate = AdminGate::LoggedIn(session("t1"));
        gate.apply(
            "t1",
            &SessionEvent::Expired {
                access_token: "t1".into(),
            },
        );
        assert_eq!(gate, AdminGate::LoggedOut);
        assert!(!gate.allows_mutation());
    }

    #[test]
    fn events_for_other_tokens_are_ignored() {
        let mut gate = AdminGate::LoggedIn(session("t1"));
        gate.apply(
            "t1",
            &SessionEvent::SignedOut {
                access_token: "t2".into(),
            },
        );
        assert!(gate.is_logged_in());
    }

    #[test]
    fn most_recent_event_wins() {
        let mut gate = AdminGate::LoggedOut;
        let events = [
            SessionEvent::SignedIn(session("t1")),
            SessionEvent::SignedOut {
                access_token: "t1".into(),
            },
            SessionEvent::SignedIn(session("t1")),
        ];
        for event in &events {
            gate.apply("t1", event);
        }
        assert!(gate.is_logged_in());
    }

    #[test]
    fn refresh_moves_the_watched_token() {
        let mut gate = AdminGate::LoggedIn(session("t1"));
        gate.apply(
            "t1",
            &SessionEvent::Refreshed {
                previous: "t1".into(),
                session: session("t2"),
            },
        );
        assert!(gate.is_logged_in());
        assert_eq!(gate.watched_token("t1"), "t2");

        let watched = gate.watched_token("t1").to_string();
        gate.apply(
            &watched,
            &SessionEvent::SignedOut {
                access_token: "t2".into(),
            },
        );
        assert!(!gate.is_logged_in());
        assert_eq!(gate.watched_token("t1"), "t1");
    }
}
