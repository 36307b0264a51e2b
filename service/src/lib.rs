//! Realm Auth
//!
//! Database-backed user authentication and role resolution.
//!
//! ## Architecture
//!
//! - Auth: password hashing and verification (argon2, bcrypt, legacy SSHA)
//! - Repositories: user and role stores, selected per realm
//! - Services: `AuthService`, one login round trip per call
//! - State: `RealmRegistry`, every configured realm built at startup

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod services;
pub mod state;
pub mod telemetry;

pub use realm_auth_shared as shared;
pub use realm_auth_shared::{
    AuthError, AuthOutcome, AuthenticatedUser, Credentials, RoleSet, StoreError, User,
};
