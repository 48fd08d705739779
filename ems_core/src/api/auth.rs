//! Authentication endpoints.
//!
//! Login and registration go out without the refresh interceptor (there is
//! no session to recover yet); change-password is an ordinary
//! authenticated call.

use super::{
    client::{ApiClient, PendingRequest, expect_json},
    errors::ApiResult,
};
use crate::{
    auth::{AuthTokens, User},
    validation::{ChangePasswordForm, LoginForm, RegistrationForm},
};
use serde::Deserialize;

const LOGIN_PATH: &str = "/auth/login/";
const REGISTER_PATH: &str = "/auth/register/";
const CHANGE_PASSWORD_PATH: &str = "/auth/change-password/";

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

impl ApiClient {
    /// Login with username and password, starting a session.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<User> {
        self.login_with(&LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await
    }

    /// Login with a validated form, starting a session.
    ///
    /// # Errors
    ///
    /// * `ApiError::Validation` - Blank username or password; nothing sent
    /// * `ApiError::Backend` - Credentials rejected
    /// * `ApiError::Auth` - Response carried an unparseable access token
    pub async fn login_with(&self, form: &LoginForm) -> ApiResult<User> {
        form.validate()?;

        let response = self
            .http()
            .post(self.url(LOGIN_PATH))
            .json(form)
            .send()
            .await?;
        let tokens: AuthTokens = expect_json(response).await?;

        Ok(self.session().login(tokens)?)
    }

    /// Register a new account and start a session for it.
    ///
    /// # Errors
    ///
    /// * `ApiError::Validation` - Missing fields or mismatched passwords; nothing sent
    /// * `ApiError::Backend` - Field-keyed errors from the backend
    pub async fn register(&self, form: &RegistrationForm) -> ApiResult<User> {
        form.validate()?;

        let response = self
            .http()
            .post(self.url(REGISTER_PATH))
            .json(form)
            .send()
            .await?;
        let tokens: AuthTokens = expect_json(response).await?;

        Ok(self.session().login(tokens)?)
    }

    /// Change the signed-in user's password.
    ///
    /// Returns the backend's confirmation message.
    pub async fn change_password(&self, form: &ChangePasswordForm) -> ApiResult<String> {
        form.validate()?;

        let body: MessageResponse = self
            .send_json(PendingRequest::post(CHANGE_PASSWORD_PATH, form)?)
            .await?;
        Ok(body
            .message
            .unwrap_or_else(|| "Password changed successfully".to_string()))
    }
}
