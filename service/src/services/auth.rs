//! Authentication service
//!
//! Orchestrates one login: user lookup, password check, and on request role
//! resolution. Holds no per-call state, so one instance can be cloned into
//! every task that needs it.
//!
//! # Timing
//!
//! An unknown username still costs one password verification, against a
//! dummy hash prepared at construction, so response time does not reveal
//! whether the account exists. A user whose stored hash uses another scheme
//! pays for the same dummy verification on top of their own, so cheap
//! legacy hashes do not stand out either.

use crate::auth::{HashScheme, PasswordVerifier};
use crate::repositories::{RoleStore, UserStore};
use realm_auth_shared::validation::validate_username;
use realm_auth_shared::{
    AuthError, AuthenticatedUser, Credentials, RoleSet, StoreError, StoreKind, User,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default upper bound on each store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

const DUMMY_PASSWORD: &str = "realm-auth-timing-equalizer";

/// Authentication service for one realm
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    verifier: PasswordVerifier,
    timeout: Duration,
    dummy_hash: Arc<str>,
}

impl AuthService {
    /// Create a service over the given stores
    ///
    /// Hashes the dummy password once, so construction is not free.
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        verifier: PasswordVerifier,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let dummy_hash = verifier
            .hash(DUMMY_PASSWORD)
            .map_err(|e| AuthError::Configuration(format!("password hashing unusable: {}", e)))?;

        Ok(Self {
            users,
            roles,
            verifier,
            timeout,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub fn verifier(&self) -> &PasswordVerifier {
        &self.verifier
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Authenticate with the configured store timeout
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        realm: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        self.authenticate_within(credentials, realm, self.timeout).await
    }

    /// Authenticate, bounding each store call by `timeout`
    ///
    /// Dropping the returned future abandons the call.
    #[instrument(skip(self, credentials, timeout), fields(username = %credentials.username))]
    pub async fn authenticate_within(
        &self,
        credentials: &Credentials,
        realm: &str,
        timeout: Duration,
    ) -> Result<AuthenticatedUser, AuthError> {
        let username = credentials.username.as_str();

        let user = if validate_username(username).is_ok() {
            bounded(
                StoreKind::User,
                "find_by_username",
                timeout,
                self.users.find_by_username(username),
            )
            .await?
        } else {
            None
        };

        let Some(user) = user else {
            self.burn_dummy_check(credentials).await;
            info!("Authentication failed: unknown user");
            return Err(AuthError::NotFound {
                username: username.to_string(),
            });
        };

        if HashScheme::detect(&user.password_hash) != Some(self.verifier.default_scheme()) {
            self.burn_dummy_check(credentials).await;
        }

        let matches = self
            .verifier
            .check_async(credentials.password().to_string(), user.password_hash.clone())
            .await
            .map_err(|e| {
                warn!(user_id = %user.id, "Stored password hash is unusable: {}", e);
                AuthError::infrastructure(StoreKind::Password, "check", StoreError::from(e))
            })?;

        if !matches {
            info!(user_id = %user.id, "Authentication failed: password mismatch");
            return Err(AuthError::CredentialMismatch);
        }

        if self.verifier.needs_rehash(&user.password_hash) {
            debug!(user_id = %user.id, "Stored password hash uses an outdated scheme");
        }

        info!(user_id = %user.id, "Authentication succeeded");
        Ok(AuthenticatedUser {
            user,
            realm: realm.to_string(),
        })
    }

    /// Authenticate and resolve the user's roles in one call
    pub async fn authenticate_with_roles(
        &self,
        credentials: &Credentials,
        realm: &str,
    ) -> Result<(AuthenticatedUser, RoleSet), AuthError> {
        let authenticated = self.authenticate(credentials, realm).await?;
        let roles = self.roles_for(&authenticated.user).await?;
        Ok((authenticated, roles))
    }

    /// Resolve a user's roles with the configured store timeout
    pub async fn roles_for(&self, user: &User) -> Result<RoleSet, AuthError> {
        self.roles_for_within(user, self.timeout).await
    }

    #[instrument(skip(self, user, timeout), fields(user_id = %user.id))]
    pub async fn roles_for_within(&self, user: &User, timeout: Duration) -> Result<RoleSet, AuthError> {
        bounded(StoreKind::Role, "roles_for", timeout, self.roles.roles_for(user)).await
    }

    /// True when the user holds every role in `required`
    pub async fn check_roles(&self, user: &User, required: &[&str]) -> Result<bool, AuthError> {
        Ok(self.roles_for(user).await?.contains_all(required))
    }

    /// True when the user holds at least one role in `candidates`
    pub async fn check_any_role(&self, user: &User, candidates: &[&str]) -> Result<bool, AuthError> {
        Ok(self.roles_for(user).await?.contains_any(candidates))
    }

    /// Fail with `Forbidden` naming every missing role
    pub async fn assert_roles(&self, user: &User, required: &[&str]) -> Result<(), AuthError> {
        let missing = self.roles_for(user).await?.missing(required);
        if missing.is_empty() {
            Ok(())
        } else {
            debug!(user_id = %user.id, ?missing, "Role check failed");
            Err(AuthError::Forbidden { missing })
        }
    }

    async fn burn_dummy_check(&self, credentials: &Credentials) {
        let _ = self
            .verifier
            .check_async(credentials.password().to_string(), self.dummy_hash.to_string())
            .await;
    }
}

/// Run one store call under a timeout, tagging failures with their origin
async fn bounded<T, F>(
    store: StoreKind,
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => {
            warn!(%store, operation, "Store call failed: {}", source);
            Err(AuthError::infrastructure(store, operation, source))
        }
        Err(_) => {
            warn!(%store, operation, ?timeout, "Store call timed out");
            Err(AuthError::infrastructure(
                store,
                operation,
                StoreError::Timeout(format!("no response within {}ms", timeout.as_millis())),
            ))
        }
    }
}
