//! Shared fixtures: a mock portal backend and a recording navigator.
//! The mock server replaces any dependency on a real school portal API.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, http::StatusCode, routing::get, routing::post};
use serde_json::{Value, json};
use tokio::sync::oneshot;

use portalgate::{Config, Navigator};

/// Install a test subscriber once; honors RUST_LOG.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Behavior knobs for the mock portal backend. Tests flip these mid-run
/// through [`MockPortalServer::state`].
#[derive(Debug, Clone)]
pub struct PortalBehavior {
    /// `Some(role)` makes the session probe answer authenticated.
    pub session_role: Option<String>,
    /// Force the probe to a bare status code (e.g. 401) instead of a body.
    pub probe_status: Option<u16>,
    /// Artificial latency before the probe answers.
    pub probe_delay: Duration,
    /// `Some(role)` makes login succeed with that role; `None` rejects.
    pub login_role: Option<String>,
    /// Artificial latency before the login answers.
    pub login_delay: Duration,
}

impl Default for PortalBehavior {
    fn default() -> Self {
        Self {
            session_role: None,
            probe_status: None,
            probe_delay: Duration::ZERO,
            login_role: None,
            login_delay: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
pub struct MockPortalServer {
    pub port: u16,
    state: Arc<Mutex<PortalBehavior>>,
    shutdown_tx: Arc<tokio::sync::Mutex<Option<oneshot::Sender<()>>>>,
}

impl MockPortalServer {
    /// Start a mock portal backend on a random available port.
    pub async fn start(behavior: PortalBehavior) -> anyhow::Result<Self> {
        let state = Arc::new(Mutex::new(behavior));

        let app = Router::new()
            .route("/api/auth/session", get(handle_probe))
            .route("/api/auth/login", post(handle_login))
            .route("/api/auth/logout", post(handle_logout))
            .route("/api/directory/branches", get(handle_branches))
            .route(
                "/api/directory/branches/{branch}/semesters",
                get(handle_semesters),
            )
            .route(
                "/api/directory/branches/{branch}/semesters/{semester}/classrooms",
                get(handle_classrooms),
            )
            .with_state(Arc::clone(&state));

        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("mock portal server failed to start");
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        Ok(Self {
            port,
            state,
            shutdown_tx: Arc::new(tokio::sync::Mutex::new(Some(shutdown_tx))),
        })
    }

    /// Crate config pointed at this server.
    pub fn config(&self) -> Config {
        Config {
            api_base: format!("http://127.0.0.1:{}/api", self.port),
            ..Config::default()
        }
    }

    /// Mutate the server behavior for subsequent requests.
    pub fn set_behavior(&self, update: impl FnOnce(&mut PortalBehavior)) {
        let mut state = self.state.lock().unwrap();
        update(&mut state);
    }

    pub async fn shutdown(self) {
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(());
        }
    }
}

type SharedBehavior = Arc<Mutex<PortalBehavior>>;

async fn handle_probe(State(state): State<SharedBehavior>) -> Response {
    let (delay, status, role) = {
        let behavior = state.lock().unwrap();
        (
            behavior.probe_delay,
            behavior.probe_status,
            behavior.session_role.clone(),
        )
    };
    tokio::time::sleep(delay).await;

    if let Some(code) = status {
        return StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response();
    }
    match role {
        Some(role) => Json(json!({"authenticated": true, "role": role})).into_response(),
        None => Json(json!({"authenticated": false, "role": null})).into_response(),
    }
}

async fn handle_login(State(state): State<SharedBehavior>, Json(_body): Json<Value>) -> Json<Value> {
    let (delay, role) = {
        let behavior = state.lock().unwrap();
        (behavior.login_delay, behavior.login_role.clone())
    };
    tokio::time::sleep(delay).await;

    match role {
        Some(role) => Json(json!({"success": true, "role": role})),
        None => Json(json!({"success": false, "message": "invalid credentials"})),
    }
}

async fn handle_logout() -> Json<Value> {
    Json(json!({"success": true}))
}

async fn handle_branches() -> Json<Value> {
    Json(json!([
        {"id": "b1", "name": "Main Campus"},
        {"id": "b2", "name": "North Campus"}
    ]))
}

async fn handle_semesters(Path(branch): Path<String>) -> Json<Value> {
    Json(json!([
        {"id": format!("{branch}-s1"), "name": "Fall"},
        {"id": format!("{branch}-s2"), "name": "Spring"}
    ]))
}

async fn handle_classrooms(Path((branch, semester)): Path<(String, String)>) -> Json<Value> {
    Json(json!([
        {"id": format!("{branch}-{semester}-c1"), "name": "10-A"}
    ]))
}

/// Navigator that records every redirect target, for asserting on guard
/// side effects from integration tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visits: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_string());
    }
}
