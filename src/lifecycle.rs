//! Session lifecycle glue: wires login, logout, and boot-time rehydration
//! into the session store.
//!
//! Two properties live here and nowhere else. First, logout is optimistic:
//! the local session clears and the cache empties before the logout request
//! is even sent, whatever the server later says. Second, auth requests are
//! tagged with a monotonically increasing sequence number; a response whose
//! tag is older than the latest issued request is discarded, so a stale
//! login response can never resurrect a session that a later logout already
//! cleared (last-writer-wins on the store, not on the network).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::api::{AuthApi, Credentials};
use crate::cache::DataCache;
use crate::error::{GateError, GateResult};
use crate::session::{Role, SessionStore};

pub struct SessionLifecycle {
    api: Arc<dyn AuthApi>,
    store: SessionStore,
    cache: DataCache,
    request_timeout: Duration,
    request_seq: AtomicU64,
    /// Serializes the stale-sequence re-check with the store commit, so a
    /// logout on another runtime thread cannot land between the two and be
    /// overwritten by the response it was meant to invalidate. Never held
    /// across an await.
    commit_lock: Mutex<()>,
}

impl SessionLifecycle {
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: SessionStore,
        cache: DataCache,
        request_timeout: Duration,
    ) -> Self {
        Self {
            api,
            store,
            cache,
            request_timeout,
            request_seq: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    fn next_seq(&self) -> u64 {
        self.request_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn latest_seq(&self) -> u64 {
        self.request_seq.load(Ordering::SeqCst)
    }

    /// Discarding a response must still commit resolution: a store left
    /// unresolved keeps every guard rendering nothing forever. The newer
    /// request that caused the discard may itself never commit (a rejected
    /// login does not touch the store), so the discard path resolves to
    /// unauthenticated when nothing has resolved yet.
    fn resolve_if_pending(&self) {
        if !self.store.snapshot().resolved {
            self.store.clear_session();
        }
    }

    /// Attempt a login. On success the session commits with the role from
    /// the response; a rejected login never mutates the store. A response
    /// arriving after a newer auth request was issued is discarded.
    pub async fn login(&self, credentials: &Credentials) -> GateResult<()> {
        let seq = self.next_seq();

        let response = match timeout(self.request_timeout, self.api.login(credentials)).await {
            Err(_) => return Err(GateError::Timeout),
            Ok(Err(e)) => return Err(e),
            Ok(Ok(response)) => response,
        };

        // No awaits below: the re-check and the commit stay one critical
        // section with logout's bump-and-clear.
        let _commit = self.commit_lock.lock().unwrap_or_else(|e| e.into_inner());

        if self.latest_seq() != seq {
            debug!(seq, "discarding stale login response");
            self.resolve_if_pending();
            return Ok(());
        }

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "invalid credentials".to_string());
            return Err(GateError::LoginRejected(message));
        }

        let role = match response.role.as_deref() {
            Some(tag) => tag.parse::<Role>()?,
            None => {
                warn!("login succeeded without a role tag; store untouched");
                return Err(GateError::UnknownRole("<missing>".to_string()));
            }
        };

        info!(role = role.as_str(), "login committed");
        self.store.set_session(true, Some(role));
        Ok(())
    }

    /// Log out. The local session clears and the cache empties immediately;
    /// the server round trip is advisory and its outcome only logged. The
    /// sequence bump here is what invalidates any login still in flight.
    pub async fn logout(&self) {
        {
            let _commit = self.commit_lock.lock().unwrap_or_else(|e| e.into_inner());
            let _seq = self.next_seq();
            self.store.clear_session();
        }
        self.cache.invalidate_all().await;

        match timeout(self.request_timeout, self.api.logout()).await {
            Ok(Ok(response)) if response.success => debug!("server session terminated"),
            Ok(Ok(_)) => debug!("server logout reported failure; local session already cleared"),
            Ok(Err(e)) => debug!(error = %e, "logout request failed; local session already cleared"),
            Err(_) => debug!("logout request timed out; local session already cleared"),
        }
    }

    /// Boot-time rehydration: probe the "who am I" endpoint and commit the
    /// result. Every failure mode (non-2xx, network error, timeout,
    /// unusable role tag) normalizes to a resolved unauthenticated session;
    /// nothing here propagates, and nothing is retried.
    pub async fn rehydrate(&self) {
        let seq = self.next_seq();
        let outcome = timeout(self.request_timeout, self.api.probe_session()).await;

        // Decide the resulting session first; the commit happens under the
        // lock below, after the staleness re-check.
        let recovered_role: Option<Role> = match outcome {
            Ok(Ok(probe)) if probe.authenticated => {
                match probe.role.as_deref().map(str::parse::<Role>) {
                    Some(Ok(role)) => Some(role),
                    _ => {
                        warn!("authenticated probe without usable role; treating as unauthenticated");
                        None
                    }
                }
            }
            Ok(Ok(_)) => {
                debug!("no server session; resolved unauthenticated");
                None
            }
            Ok(Err(e)) => {
                if e.is_unauthenticated_equivalent() {
                    debug!(error = %e, "rehydration failed; treating as unauthenticated");
                } else {
                    warn!(error = %e, "rehydration misconfigured; treating as unauthenticated");
                }
                None
            }
            Err(_) => {
                debug!("rehydration timed out; treating as unauthenticated");
                None
            }
        };

        let _commit = self.commit_lock.lock().unwrap_or_else(|e| e.into_inner());

        if self.latest_seq() != seq {
            debug!(seq, "discarding stale rehydration response");
            self.resolve_if_pending();
            return;
        }

        match recovered_role {
            Some(role) => {
                info!(role = role.as_str(), "session rehydrated");
                self.store.set_session(true, Some(role));
            }
            None => self.store.clear_session(),
        }
    }
}
