//! Realm registry
//!
//! Built once at startup from [`AuthConfig`]: one [`AuthService`] per named
//! realm, each over the provider its configuration selects. Configuration
//! problems surface here rather than on the first login.
//!
//! # Design Principles
//!
//! 1. **Validate once**: table names, hash parameters and realm names are
//!    checked before any service exists
//! 2. **Cheap cloning**: the realm map is behind an `Arc`
//! 3. **Immutable after creation**: nothing is added or swapped at runtime

use crate::auth::PasswordVerifier;
use crate::config::{AuthConfig, ProviderKind, RealmConfig};
use crate::db;
use crate::error::IntoOutcome;
use crate::repositories::{CredentialProvider, DatabaseProvider, InMemoryProvider};
use crate::services::AuthService;
use realm_auth_shared::{
    AuthError, AuthOutcome, AuthenticatedUser, Credentials, StoreError, StoreKind,
};
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
struct Realm {
    service: AuthService,
    provider: Arc<dyn CredentialProvider>,
}

impl Realm {
    fn build<P>(provider: P, verifier: PasswordVerifier, timeout: Duration) -> Result<Self, AuthError>
    where
        P: CredentialProvider + 'static,
    {
        let provider = Arc::new(provider);
        let service = AuthService::new(provider.clone(), provider.clone(), verifier, timeout)?;
        Ok(Self { service, provider })
    }
}

/// Shared registry of configured realms
#[derive(Clone)]
pub struct RealmRegistry {
    realms: Arc<BTreeMap<String, Realm>>,
    default_realm: Arc<str>,
}

impl RealmRegistry {
    /// Build every realm, connecting to the database if any realm needs it
    pub async fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;

        let needs_database = config
            .realms
            .values()
            .any(|realm| realm.provider == ProviderKind::Database);

        let pool = if needs_database {
            info!("Connecting to database...");
            let pool = db::create_pool(&config.database).await.map_err(|e| {
                AuthError::infrastructure(
                    StoreKind::User,
                    "connect",
                    StoreError::Unavailable(e.to_string()),
                )
            })?;
            Some(pool)
        } else {
            None
        };

        Self::with_pool(config, pool)
    }

    /// Build every realm over an existing pool
    ///
    /// `pool` may be `None` when no realm uses the database provider.
    pub fn with_pool(config: &AuthConfig, pool: Option<PgPool>) -> Result<Self, AuthError> {
        config.validate()?;

        let verifier = PasswordVerifier::from_config(&config.password)
            .map_err(|e| AuthError::Configuration(format!("password: {}", e)))?;

        let mut realms = BTreeMap::new();
        for (name, realm_config) in &config.realms {
            let realm = Self::build_realm(name, realm_config, pool.as_ref(), &verifier)?;
            info!(
                realm = %name,
                provider = realm.provider.name(),
                "Realm ready"
            );
            realms.insert(name.clone(), realm);
        }

        Ok(Self {
            realms: Arc::new(realms),
            default_realm: Arc::from(config.default_realm.as_str()),
        })
    }

    fn build_realm(
        name: &str,
        config: &RealmConfig,
        pool: Option<&PgPool>,
        verifier: &PasswordVerifier,
    ) -> Result<Realm, AuthError> {
        let invalid = |detail: String| AuthError::Configuration(format!("realms.{}: {}", name, detail));

        match config.provider {
            ProviderKind::Database => {
                let pool = pool.cloned().ok_or_else(|| {
                    invalid("uses the database provider but no pool is available".to_string())
                })?;
                let provider = DatabaseProvider::new(pool, &config.schema, config.case_sensitive)
                    .map_err(invalid)?;
                Realm::build(provider, verifier.clone(), config.timeout())
            }
            ProviderKind::Memory => {
                let provider =
                    InMemoryProvider::from_static_users(&config.users, config.case_sensitive)
                        .map_err(invalid)?;
                Realm::build(provider, verifier.clone(), config.timeout())
            }
        }
    }

    pub fn default_realm(&self) -> &str {
        &self.default_realm
    }

    /// Configured realm names, sorted
    pub fn realms(&self) -> impl Iterator<Item = &str> {
        self.realms.keys().map(String::as_str)
    }

    /// Service for a realm; `None` selects the default realm
    pub fn service(&self, realm: Option<&str>) -> Result<&AuthService, AuthError> {
        let name = realm.unwrap_or(self.default_realm());
        self.realms
            .get(name)
            .or_else(|| self.realms.get(&name.to_lowercase()))
            .map(|r| &r.service)
            .ok_or_else(|| AuthError::Configuration(format!("unknown realm {:?}", name)))
    }

    /// Authenticate against a realm; `None` selects the default realm
    pub async fn authenticate(
        &self,
        realm: Option<&str>,
        credentials: &Credentials,
    ) -> Result<AuthenticatedUser, AuthError> {
        let name = realm.unwrap_or(self.default_realm());
        self.service(Some(name))?.authenticate(credentials, name).await
    }

    /// Authenticate and render the caller-facing outcome
    pub async fn authenticate_outcome(
        &self,
        realm: Option<&str>,
        credentials: &Credentials,
    ) -> AuthOutcome {
        let name = realm.unwrap_or(self.default_realm());
        self.authenticate(Some(name), credentials)
            .await
            .into_outcome(name)
    }

    /// Ping every realm's provider
    pub async fn health_check(&self) -> Result<(), AuthError> {
        for (name, realm) in self.realms.iter() {
            let timeout = realm.service.timeout();
            let result = tokio::time::timeout(timeout, realm.provider.ping())
                .await
                .unwrap_or_else(|_| {
                    Err(StoreError::Timeout(format!(
                        "no response within {}ms",
                        timeout.as_millis()
                    )))
                });
            if let Err(source) = result {
                let provider = realm.provider.name();
                warn!(realm = %name, provider, "Realm health check failed: {}", source);
                return Err(AuthError::infrastructure(
                    StoreKind::Provider,
                    "ping",
                    source.context(format!("realm {} ({})", name, provider)),
                ));
            }
        }
        Ok(())
    }
}
