//! User and role stores
//!
//! `AuthService` talks to storage only through [`UserStore`] and
//! [`RoleStore`]. A [`CredentialProvider`] bundles both for one backend and
//! is what realm configuration selects.

mod database;
mod memory;
mod schema;

pub use database::DatabaseProvider;
pub use memory::{InMemoryProvider, InMemoryProviderBuilder};
pub use schema::SqlQueries;

use async_trait::async_trait;
use realm_auth_shared::{RoleSet, StoreError, User};

/// Lookup of user records by username
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `Ok(None)` when no user matches; errors are reserved for failures.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}

/// Role membership lookup
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Empty set, not an error, for a user without roles.
    async fn roles_for(&self, user: &User) -> Result<RoleSet, StoreError>;
}

/// A backend that serves both users and roles
#[async_trait]
pub trait CredentialProvider: UserStore + RoleStore {
    fn name(&self) -> &'static str;

    /// Confirm the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}
