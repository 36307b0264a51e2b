//! Realm Auth Shared Library
//!
//! Data model, request/response types and the error taxonomy shared by the
//! authentication service and its callers.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Role, RoleSet, User, UserRole};
pub use types::*;
