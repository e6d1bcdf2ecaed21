// Error types for the authorization core
// Network failures are normalized here so the session lifecycle can treat
// every transport problem as "not authenticated" without special cases.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    // Network/HTTP errors
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("JSON parsing error: {0}")]
    Json(String),

    // Wire-shape errors
    #[error("unknown role tag: {0}")]
    UnknownRole(String),

    #[error("login rejected: {0}")]
    LoginRejected(String),

    // Cascading selection errors
    #[error("selection out of order: {0} not chosen yet")]
    SelectionOrder(&'static str),

    // Configuration errors
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GateError::Timeout
        } else {
            GateError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GateError {
    fn from(err: serde_json::Error) -> Self {
        GateError::Json(err.to_string())
    }
}

impl GateError {
    /// Whether the session lifecycle should treat this failure as
    /// "definitively unauthenticated" rather than propagate it.
    /// Every transport-level failure qualifies; configuration and
    /// credential errors do not.
    pub fn is_unauthenticated_equivalent(&self) -> bool {
        matches!(
            self,
            GateError::Http(_)
                | GateError::Timeout
                | GateError::Status(_)
                | GateError::Json(_)
                | GateError::UnknownRole(_)
        )
    }

}

pub type GateResult<T> = Result<T, GateError>;
