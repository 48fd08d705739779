//! Client-side validation.
//!
//! Checks that run before a request is built. A failure here means the
//! request is never sent.

use crate::notify::Notification;
use serde::Serialize;
use thiserror::Error;

/// Validation errors caught before submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was left blank
    #[error("{0} is required")]
    Required(String),

    /// Password and its confirmation differ
    #[error("Passwords don't match")]
    PasswordMismatch,

    /// A field value doesn't fit its declared type
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Two fields share a label
    #[error("Duplicate field label '{0}'")]
    DuplicateLabel(String),

    /// No form template selected for an employee record
    #[error("Please select a form template")]
    NoTemplate,
}

impl From<ValidationError> for Notification {
    fn from(err: ValidationError) -> Self {
        Notification::error(err.to_string())
    }
}

/// Fail with `Required(label)` if `value` is blank.
pub fn require(label: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(label.to_string()))
    } else {
        Ok(())
    }
}

/// Login credentials
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Username", &self.username)?;
        require("Password", &self.password)
    }
}

/// Registration request body
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Username", &self.username)?;
        require("Password", &self.password)?;
        if self.password != self.password_confirm {
            return Err(ValidationError::PasswordMismatch);
        }
        if !self.email.is_empty() && !looks_like_email(&self.email) {
            return Err(ValidationError::InvalidValue {
                field: "Email".to_string(),
                reason: "not a valid email address".to_string(),
            });
        }
        Ok(())
    }
}

/// Change-password request body
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
}

impl ChangePasswordForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Old password", &self.old_password)?;
        require("New password", &self.new_password)
    }
}

/// Loose email shape check: something@something.
pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
