//! Authentication state for the client.
//!
//! This module owns everything the client knows about the signed-in user:
//! - The [`Session`] record (token pair, user, authenticated flag)
//! - Strict parsing of the access token's JWT claims
//! - A [`SessionStore`] that persists the session through a pluggable
//!   [`SessionStorage`] so a restart restores the login
//!
//! ## Example
//!
//! ```
//! use ems_core::auth::{AuthTokens, MemoryStorage, SessionStore, User};
//!
//! let store = SessionStore::open(Box::new(MemoryStorage::default()));
//! let user = store
//!     .login(AuthTokens {
//!         access: "access-token".to_string(),
//!         refresh: "refresh-token".to_string(),
//!         user: Some(User {
//!             id: Some(1),
//!             username: "alice".to_string(),
//!             email: "alice@example.com".to_string(),
//!         }),
//!     })
//!     .unwrap();
//!
//! assert_eq!(user.username, "alice");
//! assert!(store.is_authenticated());
//! ```

pub mod claims;
pub mod errors;
pub mod models;
pub mod store;

pub use claims::{AccessTokenClaims, decode_claims};
pub use errors::{AuthError, AuthResult};
pub use models::{AuthTokens, Session, TokenPair, User, UserId};
pub use store::{FileStorage, MemoryStorage, STORAGE_KEY, SessionStorage, SessionStore};
