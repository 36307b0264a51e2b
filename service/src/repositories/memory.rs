//! In-memory credential provider
//!
//! Users, hashes and role lists come from configuration or are added
//! through the builder. Contents never change after construction.

use super::{CredentialProvider, RoleStore, UserStore};
use crate::config::StaticUser;
use async_trait::async_trait;
use realm_auth_shared::validation::validate_username;
use realm_auth_shared::{RoleSet, StoreError, User};
use std::collections::HashMap;
use uuid::Uuid;

/// Credential provider holding everything in memory
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    users: HashMap<String, User>,
    roles: HashMap<Uuid, RoleSet>,
    case_sensitive: bool,
}

/// Builder for [`InMemoryProvider`]
#[derive(Debug, Default)]
pub struct InMemoryProviderBuilder {
    entries: Vec<StaticUser>,
    case_insensitive: bool,
}

impl InMemoryProviderBuilder {
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_insensitive = !case_sensitive;
        self
    }

    pub fn user<I, S>(mut self, username: &str, password_hash: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.push(StaticUser {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            roles: roles.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Fails on an invalid or duplicate username
    pub fn build(self) -> Result<InMemoryProvider, String> {
        InMemoryProvider::from_static_users(&self.entries, !self.case_insensitive)
    }
}

impl InMemoryProvider {
    pub fn builder() -> InMemoryProviderBuilder {
        InMemoryProviderBuilder::default()
    }

    pub fn from_static_users(entries: &[StaticUser], case_sensitive: bool) -> Result<Self, String> {
        let mut users = HashMap::with_capacity(entries.len());
        let mut roles = HashMap::with_capacity(entries.len());

        for entry in entries {
            validate_username(&entry.username)?;
            let key = lookup_key(&entry.username, case_sensitive);
            if users.contains_key(&key) {
                return Err(format!("duplicate user {:?}", entry.username));
            }

            let user = User {
                id: Uuid::new_v4(),
                username: entry.username.clone(),
                password_hash: entry.password_hash.clone(),
            };
            roles.insert(user.id, entry.roles.iter().cloned().collect::<RoleSet>());
            users.insert(key, user);
        }

        Ok(Self {
            users,
            roles,
            case_sensitive,
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Unicode lowercase folding; may differ from PostgreSQL `lower()` outside ASCII
fn lookup_key(username: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        username.to_string()
    } else {
        username.to_lowercase()
    }
}

#[async_trait]
impl UserStore for InMemoryProvider {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .get(&lookup_key(username, self.case_sensitive))
            .cloned())
    }
}

#[async_trait]
impl RoleStore for InMemoryProvider {
    async fn roles_for(&self, user: &User) -> Result<RoleSet, StoreError> {
        Ok(self.roles.get(&user.id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CredentialProvider for InMemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
