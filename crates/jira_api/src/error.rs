//! Error model used by Jira API client operations.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JiraError>;

/// Failure modes of a Jira round-trip: non-success HTTP replies, rejected credentials, timeouts, transport and decoding problems.
#[derive(Debug, Error)]
pub enum JiraError {
    #[error("http {status}: {message}")]
    Http { status: StatusCode, message: String },
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl JiraError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        JiraError::Http {
            status,
            message: message.into(),
        }
    }

    /// Builds the error for a non-success reply, pulling Jira's `errorMessages` out of the body when present.
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return JiraError::Authentication(format!("access denied ({status})"));
        }
        let message = extract_error_messages(body).unwrap_or_else(|| body.trim().to_string());
        JiraError::http(status, message)
    }

    /// True when the error means the credentials were rejected.
    pub fn is_authentication(&self) -> bool {
        matches!(self, JiraError::Authentication(_))
    }
}

impl From<reqwest::Error> for JiraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JiraError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            JiraError::http(status, err.to_string())
        } else if err.is_connect() {
            JiraError::Network(err.to_string())
        } else if err.is_decode() {
            JiraError::Serialization(err.to_string())
        } else {
            JiraError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for JiraError {
    fn from(err: serde_json::Error) -> Self {
        JiraError::Serialization(err.to_string())
    }
}

fn extract_error_messages(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let messages = value.get("errorMessages")?.as_array()?;
    let joined = messages
        .iter()
        .filter_map(|message| message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
