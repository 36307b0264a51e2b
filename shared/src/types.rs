//! Request and response types for authentication calls

use crate::errors::AuthError;
use crate::models::User;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Username/password pair supplied by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Successful authentication
///
/// `realm` is the tag the caller passed in, returned unmodified so the
/// session layer can bind to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user: User,
    pub realm: String,
}

/// Failure category shown to the end user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeErrorCode {
    InvalidCredentials,
    Forbidden,
    ServiceUnavailable,
    Misconfigured,
}

/// Error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub code: OutcomeErrorCode,
    pub message: String,
}

impl From<&AuthError> for OutcomeError {
    fn from(err: &AuthError) -> Self {
        let code = match err {
            AuthError::NotFound { .. } | AuthError::CredentialMismatch => {
                OutcomeErrorCode::InvalidCredentials
            }
            AuthError::Forbidden { .. } => OutcomeErrorCode::Forbidden,
            AuthError::Infrastructure { .. } => OutcomeErrorCode::ServiceUnavailable,
            AuthError::Configuration(_) => OutcomeErrorCode::Misconfigured,
        };
        Self {
            code,
            message: err.public_message().to_string(),
        }
    }
}

/// Caller-facing result of one authentication attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    pub realm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

impl AuthOutcome {
    pub fn success(authenticated: AuthenticatedUser) -> Self {
        Self {
            success: true,
            realm: authenticated.realm,
            user: Some(authenticated.user),
            error: None,
        }
    }

    pub fn failure(realm: impl Into<String>, err: &AuthError) -> Self {
        Self {
            success: false,
            realm: realm.into(),
            user: None,
            error: Some(OutcomeError::from(err)),
        }
    }
}
