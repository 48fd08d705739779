//! REST API access.
//!
//! [`ApiClient`] wraps a `reqwest::Client` with the session: every request
//! is sent with the current bearer token, and a 401 triggers a single
//! refresh-and-replay before the error reaches the caller. The endpoint
//! groups live in their own modules as `impl ApiClient` blocks.

pub mod auth;
pub mod client;
pub mod employees;
pub mod errors;
pub mod forms;

pub use client::{ApiClient, LOGOUT_PATH, PendingRequest, REFRESH_PATH};
pub use forms::SavedForm;
pub use errors::{ApiError, ApiResult, FieldError};

pub use reqwest::StatusCode;
