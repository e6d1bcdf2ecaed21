//! Route guards: component-level gates around protected subtrees.
//!
//! A guard consults the role policy on every render and owns two decisions:
//! what to paint (the subtree or nothing) and whether to navigate away. The
//! navigation runs after render commit, never during render, so a redirect
//! can never interleave with an in-progress render pass. Guards are a UX
//! boundary layered over the policy; the server remains the authority on
//! what data a session may actually fetch.

use tracing::{debug, info};

use crate::policy::{self, Destinations, GuardOutcome};
use crate::session::{Role, SessionSnapshot, SessionStore};

/// Side-effect seam for the redirect navigation.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// Per-guard lifecycle. `Unresolved` exists only during the window before
/// boot-time rehydration completes; a guard in that state must not redirect
/// an eventually-authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unresolved,
    Allowed,
    Redirected,
}

/// What the guard paints for this render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRender {
    Children,
    /// Rendered while unresolved and while redirecting, so protected
    /// content never flashes before a redirect lands.
    Nothing,
}

pub struct RouteGuard {
    required_role: Option<Role>,
    destinations: Destinations,
    state: GuardState,
    last_redirect: Option<String>,
    pending_redirect: Option<String>,
}

impl RouteGuard {
    pub fn new(required_role: Option<Role>, destinations: Destinations) -> Self {
        Self {
            required_role,
            destinations,
            state: GuardState::Unresolved,
            last_redirect: None,
            pending_redirect: None,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Render pass: decide what to paint and record any redirect effect.
    /// Performs no navigation itself; call [`commit`](Self::commit) after
    /// the render has been committed.
    pub fn render(&mut self, snapshot: SessionSnapshot) -> GuardRender {
        if !snapshot.resolved {
            // Session still unknown: painting the subtree could flash
            // protected content, redirecting could bounce a valid session.
            self.state = GuardState::Unresolved;
            self.pending_redirect = None;
            return GuardRender::Nothing;
        }

        let result = policy::evaluate(self.required_role, &snapshot.session, &self.destinations);
        match result.outcome {
            GuardOutcome::Allow => {
                self.state = GuardState::Allowed;
                self.last_redirect = None;
                self.pending_redirect = None;
                GuardRender::Children
            }
            GuardOutcome::Redirect => {
                let target = result
                    .redirect_to
                    .unwrap_or_else(|| self.destinations.login.clone());
                // One navigation per transition: re-rendering while already
                // redirected at the same target must not re-fire the effect.
                if self.state != GuardState::Redirected
                    || self.last_redirect.as_deref() != Some(target.as_str())
                {
                    self.pending_redirect = Some(target.clone());
                    self.last_redirect = Some(target);
                } else {
                    self.pending_redirect = None;
                }
                self.state = GuardState::Redirected;
                GuardRender::Nothing
            }
        }
    }

    /// Commit pass: run the redirect recorded by the preceding render.
    pub fn commit(&mut self, navigator: &dyn Navigator) {
        if let Some(target) = self.pending_redirect.take() {
            info!(
                required_role = self.required_role.map(|r| r.as_str()),
                target = %target,
                "guard redirect"
            );
            navigator.navigate(&target);
        } else {
            debug!(state = ?self.state, "guard commit, no navigation");
        }
    }

    /// Convenience for callers without a separate render/commit split:
    /// evaluate against the store's current snapshot and immediately run
    /// any redirect effect.
    pub fn evaluate(&mut self, store: &SessionStore, navigator: &dyn Navigator) -> GuardRender {
        let render = self.render(store.snapshot());
        self.commit(navigator);
        render
    }
}
