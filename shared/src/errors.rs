//! Error types for realm authentication

use std::fmt;
use thiserror::Error;

/// The collaborator an infrastructure failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    User,
    Role,
    Password,
    Provider,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreKind::User => "user",
            StoreKind::Role => "role",
            StoreKind::Password => "password",
            StoreKind::Provider => "provider",
        };
        f.write_str(name)
    }
}

/// Storage layer error types
///
/// Returned by user and role stores. "Not found" is never an error here;
/// stores report a missing user as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Password hashing and verification error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("unrecognized password hash scheme")]
    UnknownScheme,

    #[error("malformed password hash: {0}")]
    Malformed(String),

    #[error("legacy password hashes are disabled")]
    LegacyDisabled,

    #[error("failed to hash password: {0}")]
    Hashing(String),

    #[error("hashing task failed: {0}")]
    Join(String),
}

impl StoreError {
    /// Prefix the detail message, keeping the variant
    pub fn context(self, prefix: impl fmt::Display) -> Self {
        match self {
            StoreError::Unavailable(m) => StoreError::Unavailable(format!("{}: {}", prefix, m)),
            StoreError::Timeout(m) => StoreError::Timeout(format!("{}: {}", prefix, m)),
            StoreError::Query(m) => StoreError::Query(format!("{}: {}", prefix, m)),
            StoreError::CorruptData(m) => StoreError::CorruptData(format!("{}: {}", prefix, m)),
            StoreError::Internal(m) => StoreError::Internal(format!("{}: {}", prefix, m)),
        }
    }
}

impl From<PasswordError> for StoreError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::UnknownScheme
            | PasswordError::Malformed(_)
            | PasswordError::LegacyDisabled => StoreError::CorruptData(err.to_string()),
            PasswordError::Hashing(_) | PasswordError::Join(_) => {
                StoreError::Internal(err.to_string())
            }
        }
    }
}

/// Authentication error types
///
/// `NotFound` and `CredentialMismatch` stay distinct for logging but share
/// one public message so callers cannot enumerate usernames.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("no user named {username:?}")]
    NotFound { username: String },

    #[error("password does not match")]
    CredentialMismatch,

    #[error("{store} store failed during {operation}: {source}")]
    Infrastructure {
        store: StoreKind,
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("missing required roles: {}", missing.join(", "))]
    Forbidden { missing: Vec<String> },
}

/// Generic message returned for both unknown users and wrong passwords
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

impl AuthError {
    pub fn infrastructure(store: StoreKind, operation: &'static str, source: StoreError) -> Self {
        AuthError::Infrastructure {
            store,
            operation,
            source,
        }
    }

    /// True for failures that must be reported to the user as bad credentials
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(
            self,
            AuthError::NotFound { .. } | AuthError::CredentialMismatch
        )
    }

    /// True when the system, not the user, is at fault
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, AuthError::Infrastructure { .. })
    }

    /// Message safe to show to the end user
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::NotFound { .. } | AuthError::CredentialMismatch => INVALID_CREDENTIALS,
            AuthError::Infrastructure { .. } => "Authentication service unavailable",
            AuthError::Configuration(_) => "Authentication is misconfigured",
            AuthError::Forbidden { .. } => "Insufficient permissions",
        }
    }
}
