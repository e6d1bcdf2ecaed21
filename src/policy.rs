// Role policy: the pure authorization function every guard consults.
// Kept free of side effects so it is testable without rendering anything.

use serde::Serialize;

use crate::session::{Role, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardOutcome {
    Allow,
    Redirect,
}

/// Ephemeral result of one policy evaluation; computed per render pass,
/// never stored. `redirect_to` is present iff the outcome is `Redirect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteGuardResult {
    pub outcome: GuardOutcome,
    pub redirect_to: Option<String>,
}

impl RouteGuardResult {
    fn allow() -> Self {
        Self {
            outcome: GuardOutcome::Allow,
            redirect_to: None,
        }
    }

    fn redirect(to: impl Into<String>) -> Self {
        Self {
            outcome: GuardOutcome::Redirect,
            redirect_to: Some(to.into()),
        }
    }

    pub fn is_allow(&self) -> bool {
        self.outcome == GuardOutcome::Allow
    }
}

/// Redirect destinations for the two deny cases. Both must point at
/// unguarded pages, or a denied redirect would loop through the same
/// failing guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    /// Where "not logged in" lands (recovery: log in)
    pub login: String,
    /// Where "logged in but wrong role" lands (recovery: contact an
    /// administrator). Distinct from `login` on purpose: conflating the
    /// two produces the wrong user-facing messaging.
    pub not_authorized: String,
}

impl Default for Destinations {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            not_authorized: "/not-authorized".to_string(),
        }
    }
}

/// The four-way authorization branch.
///
/// - no required role: allow, authenticated or not
/// - unauthenticated: redirect to login, whatever the requirement
/// - authenticated, wrong role: redirect to not-authorized
/// - authenticated, matching role: allow
pub fn evaluate(
    required_role: Option<Role>,
    session: &Session,
    destinations: &Destinations,
) -> RouteGuardResult {
    let Some(required) = required_role else {
        return RouteGuardResult::allow();
    };
    if !session.is_authenticated {
        return RouteGuardResult::redirect(destinations.login.clone());
    }
    if session.role != Some(required) {
        return RouteGuardResult::redirect(destinations.not_authorized.clone());
    }
    RouteGuardResult::allow()
}
