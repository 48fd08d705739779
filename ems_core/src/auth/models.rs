//! Authentication data models.

use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// The signed-in user as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Access/refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Login and registration response body
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthTokens {
    /// Split off the token pair, discarding the user payload.
    pub fn pair(&self) -> TokenPair {
        TokenPair {
            access: self.access.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

/// Client session, persisted between runs.
///
/// Field names follow the persisted JSON layout (`accessToken`,
/// `refreshToken`, `user`, `isAuthenticated`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl Session {
    /// Build an authenticated session from a token pair and user.
    pub fn authenticated(tokens: TokenPair, user: User) -> Self {
        Self {
            access_token: Some(tokens.access),
            refresh_token: Some(tokens.refresh),
            user: Some(user),
            is_authenticated: true,
        }
    }

    /// A session restored from storage is only trusted if its flag agrees
    /// with the presence of an access token.
    pub fn is_consistent(&self) -> bool {
        self.is_authenticated == self.access_token.is_some()
    }
}
