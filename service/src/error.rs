//! Error conversion at the crate boundary
//!
//! Maps driver errors onto [`StoreError`] and turns authentication results
//! into caller-facing [`AuthOutcome`]s, logging anything the caller will
//! only see as a generic message.

use realm_auth_shared::{AuthError, AuthOutcome, AuthenticatedUser, StoreError};
use tracing::{debug, error, warn};

/// Classify a sqlx error
///
/// Connection-level failures become `Unavailable` so callers can tell
/// "system down" apart from a bad query.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout("no pooled connection available".to_string()),
        sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".to_string()),
        sqlx::Error::Io(e) => StoreError::Unavailable(e.to_string()),
        sqlx::Error::Tls(e) => StoreError::Unavailable(e.to_string()),
        sqlx::Error::WorkerCrashed => StoreError::Unavailable("database worker crashed".to_string()),
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::CorruptData(format!("column {}: {}", index, source))
        }
        sqlx::Error::Decode(e) => StoreError::CorruptData(e.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

/// Convert an authentication result into the caller-facing outcome
pub trait IntoOutcome {
    fn into_outcome(self, realm: &str) -> AuthOutcome;
}

impl IntoOutcome for Result<AuthenticatedUser, AuthError> {
    fn into_outcome(self, realm: &str) -> AuthOutcome {
        match self {
            Ok(authenticated) => AuthOutcome::success(authenticated),
            Err(err) => {
                match &err {
                    AuthError::NotFound { username } => {
                        debug!(realm, username = %username, "Login failed: unknown user")
                    }
                    AuthError::CredentialMismatch => {
                        debug!(realm, "Login failed: password mismatch")
                    }
                    AuthError::Forbidden { missing } => {
                        debug!(realm, ?missing, "Login refused: missing roles")
                    }
                    AuthError::Infrastructure { .. } => {
                        error!(realm, "Authentication infrastructure error: {}", err)
                    }
                    AuthError::Configuration(_) => {
                        warn!(realm, "Authentication configuration error: {}", err)
                    }
                }
                AuthOutcome::failure(realm, &err)
            }
        }
    }
}
