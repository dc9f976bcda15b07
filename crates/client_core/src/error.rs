use shared::{domain::RoutePath, error::ApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid items endpoint '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("items request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("items request returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("items response could not be decoded: {0}")]
    Decode(String),
    #[error("mocked items request failed: {0}")]
    Mocked(String),
}

impl FetchError {
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = match ApiError::from_body(body) {
            Some(api_error) => api_error.to_string(),
            None if body.trim().is_empty() => "empty response body".to_string(),
            None => body.trim().to_string(),
        };
        FetchError::Status { status, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NotFound(RoutePath),
    #[error("router is no longer mounted")]
    Unmounted,
}

/// Failure of a guarded action, tagged by the sub-step that failed.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("fetching items failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("navigation failed: {0}")]
    Navigation(#[from] NavigationError),
}

impl ActionError {
    pub fn stage(&self) -> &'static str {
        match self {
            ActionError::Fetch(_) => "fetch",
            ActionError::Navigation(_) => "navigation",
        }
    }
}
