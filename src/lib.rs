//! portalgate — role-gated navigation and session authorization core for a
//! school transparency portal.
//!
//! The portal's pages are presentation; the one subsystem with real
//! state-transition logic is the gate deciding which routes and menu items
//! a visitor may reach given an authentication flag and a role tag, and how
//! that gate behaves while the session is still being resolved at boot.
//! This crate is that subsystem:
//!
//! - [`session::SessionStore`] — the single observable owner of session
//!   state, with two named mutation entry points and snapshot reads.
//! - [`policy::evaluate`] — the pure four-way allow/redirect contract,
//!   keeping "not logged in" distinct from "logged in but wrong role".
//! - [`guard::RouteGuard`] — the per-route gate with an explicit
//!   unresolved state and redirect-after-commit semantics.
//! - [`navigation::visible_items`] — the order-preserving menu filter.
//! - [`lifecycle::SessionLifecycle`] — login, optimistic logout, and
//!   boot rehydration, with stale-response sequencing.
//! - [`cascade::CascadeController`] — the branch → semester → classroom
//!   selection flow with stale-fetch discarding.

pub mod api;
pub mod cache;
pub mod cascade;
pub mod config;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod navigation;
pub mod policy;
pub mod session;

pub use api::{AuthApi, Credentials, DirectoryApi, DirectoryEntry, HttpAuthApi};
pub use cache::DataCache;
pub use cascade::{CascadeController, CascadeState};
pub use config::Config;
pub use error::{GateError, GateResult};
pub use guard::{GuardRender, GuardState, Navigator, RouteGuard};
pub use lifecycle::SessionLifecycle;
pub use navigation::{NavigationItem, visible_items};
pub use policy::{Destinations, GuardOutcome, RouteGuardResult, evaluate};
pub use session::{Role, Session, SessionSnapshot, SessionState, SessionStore};
