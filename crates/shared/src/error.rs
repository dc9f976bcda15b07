use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorCode::NotFound => "not_found",
            ErrorCode::Internal => "internal",
        };
        f.write_str(label)
    }
}

/// JSON error body returned by the mock API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Parses an error body, returning `None` for anything that is not an
    /// `ApiError` document.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_round_trips_with_snake_case_code() {
        let body = serde_json::to_string(&ApiError::new(ErrorCode::NotFound, "no such item"))
            .expect("json");
        assert_eq!(body, r#"{"code":"not_found","message":"no such item"}"#);
        let parsed = ApiError::from_body(&body).expect("api error");
        assert_eq!(parsed.to_string(), "not_found: no such item");
    }

    #[test]
    fn non_error_bodies_are_ignored() {
        assert!(ApiError::from_body("Internal Server Error").is_none());
        assert!(ApiError::from_body(r#"{"items":[]}"#).is_none());
    }
}
