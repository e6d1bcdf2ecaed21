use std::time::Duration;

use url::Url;

use crate::error::{GateError, GateResult};

/// Configuration for the portal authorization core
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the portal API (session probe, login, logout)
    pub api_base: String,
    /// Unguarded destination for "not logged in" redirects
    pub login_path: String,
    /// Unguarded destination for "logged in but wrong role" redirects.
    /// Must stay distinct from `login_path`: the two cases carry different
    /// user-facing messaging and different recovery actions.
    pub not_authorized_path: String,
    /// Outer deadline applied to every auth-related network call
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:4000/api".to_string(),
            login_path: "/login".to_string(),
            not_authorized_path: "/not-authorized".to_string(),
            request_timeout_ms: 15_000,
        }
    }
}

impl Config {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: std::env::var("PORTALGATE_API_BASE").unwrap_or(defaults.api_base),
            login_path: std::env::var("PORTALGATE_LOGIN_PATH").unwrap_or(defaults.login_path),
            not_authorized_path: std::env::var("PORTALGATE_NOT_AUTHORIZED_PATH")
                .unwrap_or(defaults.not_authorized_path),
            request_timeout_ms: std::env::var("PORTALGATE_TIMEOUT_MS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
        }
    }

    /// Validate the API base URL and join an endpoint path onto it
    pub fn endpoint(&self, path: &str) -> GateResult<String> {
        let base = Url::parse(&self.api_base)
            .map_err(|e| GateError::InvalidEndpoint(format!("{}: {}", self.api_base, e)))?;
        match base.scheme() {
            "http" | "https" => {}
            other => return Err(GateError::InvalidEndpoint(format!("scheme {other}"))),
        }
        // Url::join would drop the last base segment when the base lacks a
        // trailing slash, so build the joined form by hand.
        Ok(format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Redirect destinations handed to the role policy
    pub fn destinations(&self) -> crate::policy::Destinations {
        crate::policy::Destinations {
            login: self.login_path.clone(),
            not_authorized: self.not_authorized_path.clone(),
        }
    }
}
