//! Error taxonomy for the API client and the refresh driver.

use std::time::Duration;

use thiserror::Error;

/// The three error kinds every request can surface.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 401: the token is missing, invalid or expired. Not retried.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Timeouts and socket/connector failures. Transient.
    #[error("connection error: {0}")]
    Connection(String),

    /// Unmapped HTTP statuses, unexpected payloads and any other transport error.
    #[error("api error: {0}")]
    Api(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, ApiError::Connection(_))
    }

    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ApiError::Connection(format!(
                "Connection timeout after {}s",
                timeout.as_secs_f64()
            ))
        } else if err.is_connect() {
            ApiError::Connection(format!("Cannot connect to MoviePilot: {err}"))
        } else {
            ApiError::Api(format!("API client error: {err}"))
        }
    }
}

/// Failures surfaced by the refresh driver.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Fatal for setup: the configured token is rejected.
    #[error("authentication failed: {0}")]
    Auth(ApiError),

    /// The server cannot be reached yet; setup may be retried later.
    #[error("MoviePilot not ready: {0}")]
    NotReady(ApiError),

    /// A single refresh produced no data. Recoverable on the next interval.
    #[error("update failed: {0}")]
    UpdateFailed(String),

    #[error("scan interval {0}s is outside the supported range of 10..=300s")]
    InvalidInterval(u64),
}
