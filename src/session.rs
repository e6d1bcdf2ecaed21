// Session state: the only shared mutable resource in the portal core.
// All mutation funnels through SessionStore; every other component reads a
// snapshot valid for the current render pass only.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::error::GateError;

/// Closed role enumeration. "administrator" appears in contact-form copy
/// only and is never enforced, so it is not a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            other => Err(GateError::UnknownRole(other.to_string())),
        }
    }
}

/// Client-side session record: authenticated flag plus role tag.
///
/// Invariant: `role` is `None` whenever `is_authenticated` is false. The
/// store enforces this on every write, so a read can never observe a role
/// on an unauthenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub is_authenticated: bool,
    pub role: Option<Role>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(role: Role) -> Self {
        Self {
            is_authenticated: true,
            role: Some(role),
        }
    }
}

/// Read view of the store: the committed session plus whether boot-time
/// rehydration has completed. Guards must not evaluate before `resolved`
/// is true or a refreshed valid session would bounce to the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub resolved: bool,
    pub session: Session,
}

impl SessionSnapshot {
    /// The explicit three-state model: a bare authenticated boolean cannot
    /// distinguish "not yet known" from "known to be unauthenticated".
    pub fn state(&self) -> SessionState {
        if !self.resolved {
            SessionState::Unknown
        } else {
            match self.session.role {
                Some(role) if self.session.is_authenticated => SessionState::Authenticated(role),
                _ => SessionState::Unauthenticated,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Rehydration still pending
    Unknown,
    Authenticated(Role),
    Unauthenticated,
}

/// Observable session store. Created at process start in the unresolved
/// anonymous state; mutated only by the two named transitions plus the
/// resolution commit, each of which replaces both fields atomically and
/// notifies subscribers exactly once.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let initial = SessionSnapshot {
            resolved: false,
            session: Session::anonymous(),
        };
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Latest committed snapshot. Synchronous and infallible.
    pub fn snapshot(&self) -> SessionSnapshot {
        *self.tx.borrow()
    }

    pub fn session(&self) -> Session {
        self.snapshot().session
    }

    /// Subscribe to session changes. Each mutating call produces exactly
    /// one notification on the returned receiver.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Replace the session. Malformed input is corrected here, not by the
    /// caller: an unauthenticated session always persists with no role.
    /// Committing a session also marks resolution complete, since both
    /// login success and rehydration produce a definitively known state.
    pub fn set_session(&self, is_authenticated: bool, role: Option<Role>) {
        let role = if is_authenticated { role } else { None };
        let next = SessionSnapshot {
            resolved: true,
            session: Session {
                is_authenticated,
                role,
            },
        };
        debug!(
            authenticated = is_authenticated,
            role = role.map(|r| r.as_str()),
            "session transition"
        );
        self.tx.send_replace(next);
    }

    /// Equivalent to `set_session(false, None)`. Idempotent.
    pub fn clear_session(&self) {
        self.set_session(false, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unresolved_and_anonymous() {
        let store = SessionStore::new();
        let snapshot = store.snapshot();
        assert!(!snapshot.resolved);
        assert_eq!(snapshot.session, Session::anonymous());
        assert_eq!(snapshot.state(), SessionState::Unknown);
    }

    #[test]
    fn set_session_commits_both_fields_and_resolves() {
        let store = SessionStore::new();
        store.set_session(true, Some(Role::Teacher));
        let snapshot = store.snapshot();
        assert!(snapshot.resolved);
        assert_eq!(snapshot.session, Session::authenticated(Role::Teacher));
        assert_eq!(snapshot.state(), SessionState::Authenticated(Role::Teacher));
    }

    #[test]
    fn unauthenticated_write_drops_role() {
        // The store corrects malformed input rather than trusting callers.
        let store = SessionStore::new();
        store.set_session(false, Some(Role::Teacher));
        let snapshot = store.snapshot();
        assert!(!snapshot.session.is_authenticated);
        assert_eq!(snapshot.session.role, None);
        assert_eq!(snapshot.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn clear_session_is_idempotent() {
        let store = SessionStore::new();
        store.set_session(true, Some(Role::Student));
        store.clear_session();
        let once = store.snapshot();
        store.clear_session();
        assert_eq!(store.snapshot(), once);
        assert_eq!(once.session, Session::anonymous());
        assert!(once.resolved);
    }

    #[tokio::test]
    async fn one_notification_per_mutating_call() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.set_session(true, Some(Role::Parent));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());

        // Even a no-op value change notifies once per call.
        store.clear_session();
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        store.clear_session();
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn role_parsing_is_case_insensitive_and_closed() {
        assert_eq!("Student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("TEACHER".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("parent".parse::<Role>().unwrap(), Role::Parent);
        assert!(matches!(
            "administrator".parse::<Role>(),
            Err(GateError::UnknownRole(_))
        ));
    }
}
