//! External portal API surface.
//!
//! The authorization core consumes the backend as two small async
//! capabilities: `AuthApi` for the session endpoints (probe, login,
//! logout) and `DirectoryApi` for the cascading branch/semester/classroom
//! lookups. `HttpAuthApi` implements both over reqwest with an enforced
//! request timeout; the traits are the seam the tests mock.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{GateError, GateResult};

/// Login credentials, posted as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// `GET /auth/session` — the "who am I" rehydration probe.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionProbeResponse {
    pub authenticated: bool,
    #[serde(default)]
    pub role: Option<String>,
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /auth/logout` response. Advisory only: the local session clears
/// whatever this says.
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// One row of a directory listing (branch, semester, or classroom).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn probe_session(&self) -> GateResult<SessionProbeResponse>;
    async fn login(&self, credentials: &Credentials) -> GateResult<LoginResponse>;
    async fn logout(&self) -> GateResult<LogoutResponse>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn fetch_branches(&self) -> GateResult<Vec<DirectoryEntry>>;
    async fn fetch_semesters(&self, branch_id: &str) -> GateResult<Vec<DirectoryEntry>>;
    async fn fetch_classrooms(
        &self,
        branch_id: &str,
        semester_id: &str,
    ) -> GateResult<Vec<DirectoryEntry>>;
}

/// HTTP implementation of both API capabilities.
pub struct HttpAuthApi {
    client: reqwest::Client,
    config: Config,
}

impl HttpAuthApi {
    pub fn new(config: Config) -> GateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .use_rustls_tls()
            .build()
            .map_err(|e| GateError::Http(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GateResult<T> {
        let url = self.config.endpoint(path)?;
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GateError::Status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> GateResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path)?;
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GateError::Status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn probe_session(&self) -> GateResult<SessionProbeResponse> {
        self.get_json("/auth/session").await
    }

    async fn login(&self, credentials: &Credentials) -> GateResult<LoginResponse> {
        self.post_json("/auth/login", credentials).await
    }

    async fn logout(&self) -> GateResult<LogoutResponse> {
        self.post_json("/auth/logout", &serde_json::json!({})).await
    }
}

#[async_trait]
impl DirectoryApi for HttpAuthApi {
    async fn fetch_branches(&self) -> GateResult<Vec<DirectoryEntry>> {
        self.get_json("/directory/branches").await
    }

    async fn fetch_semesters(&self, branch_id: &str) -> GateResult<Vec<DirectoryEntry>> {
        self.get_json(&format!("/directory/branches/{branch_id}/semesters"))
            .await
    }

    async fn fetch_classrooms(
        &self,
        branch_id: &str,
        semester_id: &str,
    ) -> GateResult<Vec<DirectoryEntry>> {
        self.get_json(&format!(
            "/directory/branches/{branch_id}/semesters/{semester_id}/classrooms"
        ))
        .await
    }
}
