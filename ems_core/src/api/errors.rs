//! API error types.

use crate::{auth::AuthError, notify::Notification, validation::ValidationError};
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Keys whose messages aren't tied to a particular form field.
const GENERAL_KEYS: [&str; 4] = ["detail", "error", "message", "non_field_errors"];

/// One message from a backend error payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field the message is keyed by, `None` for general errors
    pub field: Option<String>,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, DNS, TLS, ...
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Request failed ({status}){}", summarize(.errors))]
    Backend {
        status: StatusCode,
        errors: Vec<FieldError>,
    },

    /// The session could not be recovered; the user must log in again
    #[error("Session expired")]
    SessionExpired,

    /// Response body didn't have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Session/token handling failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request rejected before it was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configured base URL is unusable
    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
}

fn summarize(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
        format!(": {}", joined.join("; "))
    }
}

impl ApiError {
    /// Build a backend error from a status and raw response body.
    pub fn backend(status: StatusCode, body: &str) -> Self {
        ApiError::Backend {
            status,
            errors: parse_error_body(body),
        }
    }

    /// HTTP status for backend errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Notifications to show for this error.
    ///
    /// Field-keyed backend payloads yield one notification per message;
    /// transport and unknown failures yield a single generic one.
    pub fn notifications(&self) -> Vec<Notification> {
        match self {
            ApiError::Backend { errors, .. } if !errors.is_empty() => errors
                .iter()
                .map(|e| Notification::error(e.to_string()))
                .collect(),
            ApiError::Backend { status, .. } => vec![Notification::error(format!(
                "Request failed ({}). Please try again.",
                status
            ))],
            ApiError::SessionExpired => vec![Notification::error(
                "Your session has expired. Please log in again.",
            )],
            ApiError::Network(_) => vec![Notification::error(
                "Network error. Please check your connection and try again.",
            )],
            ApiError::Decode(_) => {
                vec![Notification::error("Unexpected response from the server.")]
            }
            ApiError::Auth(e) => vec![Notification::error(e.client_message())],
            ApiError::Validation(e) => vec![Notification::error(e.to_string())],
            ApiError::InvalidBaseUrl(_) => vec![Notification::error(self.to_string())],
        }
    }
}

/// Flatten a backend error body into messages.
///
/// Understands the usual REST framework shapes: `{"field": ["msg", ...]}`,
/// `{"detail": "msg"}`, a bare list of messages or a bare string. Anything
/// else (HTML error pages, empty bodies) yields no messages.
pub fn parse_error_body(body: &str) -> Vec<FieldError> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };

    match value {
        Value::Object(map) => map
            .into_iter()
            .flat_map(|(key, value)| {
                let field = (!GENERAL_KEYS.contains(&key.as_str())).then_some(key);
                messages(value)
                    .into_iter()
                    .map(move |message| FieldError {
                        field: field.clone(),
                        message,
                    })
            })
            .collect(),
        other => messages(other)
            .into_iter()
            .map(|message| FieldError {
                field: None,
                message,
            })
            .collect(),
    }
}

fn messages(value: Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s],
        Value::Array(items) => items.into_iter().flat_map(messages).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_keyed_errors() {
        let errors = parse_error_body(
            r#"{"username":["A user with that username already exists."],"password":["Too short.","Too common."]}"#,
        );

        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&FieldError {
            field: Some("password".to_string()),
            message: "Too common.".to_string(),
        }));
    }

    #[test]
    fn test_parse_general_error_keys() {
        let errors = parse_error_body(r#"{"error":"Invalid old password"}"#);
        assert_eq!(
            errors,
            vec![FieldError {
                field: None,
                message: "Invalid old password".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_non_json_body() {
        assert!(parse_error_body("<html>502 Bad Gateway</html>").is_empty());
        assert!(parse_error_body("").is_empty());
    }

    #[test]
    fn test_notifications_one_per_message() {
        let err = ApiError::backend(
            StatusCode::BAD_REQUEST,
            r#"{"username":["taken"],"email":["invalid"]}"#,
        );
        let notes = err.notifications();

        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(Notification::is_error));
        assert!(notes.iter().any(|n| n.message == "username: taken"));
    }

    #[test]
    fn test_notifications_generic_for_empty_backend_error() {
        let err = ApiError::backend(StatusCode::INTERNAL_SERVER_ERROR, "");
        let notes = err.notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("500"));
    }

    #[test]
    fn test_backend_error_display() {
        let err = ApiError::backend(StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#);
        assert_eq!(err.to_string(), "Request failed (404 Not Found): Not found.");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }
}
