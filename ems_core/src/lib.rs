//! # EMS Core
//!
//! Client-side core of the Employee Management System: session lifecycle,
//! an HTTP client that transparently refreshes expired access tokens, typed
//! services for the REST backend, and the in-memory state behind the form
//! builder and the employee list.
//!
//! ## Core Modules
//!
//! - [`auth`]: Session model, token claims and the persisted session store
//! - [`api`]: HTTP client, refresh interceptor and REST services
//! - [`forms`]: Form template models and the form builder state
//! - [`employees`]: Employee models, record drafts, debounced list/search
//! - [`routes`]: Route table and the authentication guard
//!
//! ## Example
//!
//! ```no_run
//! use ems_core::{ApiClient, auth::{MemoryStorage, SessionStore}};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Arc::new(SessionStore::open(Box::new(MemoryStorage::default())));
//!     let api = ApiClient::new("http://localhost:8000", session)?;
//!     let user = api.login("alice", "s3cret").await?;
//!     println!("Logged in as {}", user.username);
//!     Ok(())
//! }
//! ```

/// Session model, token claims and persistence.
pub mod auth;

/// HTTP client with refresh interception, plus REST services.
pub mod api;
pub use api::{ApiClient, ApiError, ApiResult};

/// Employee records, drafts and the searchable list.
pub mod employees;

/// Form templates and the form builder.
pub mod forms;

pub mod notify;
pub use notify::{Notification, NotificationLevel};

pub mod routes;
pub use routes::{Route, RouteDecision, guard};

pub mod validation;
pub use validation::ValidationError;
