//! Business logic services
//!
//! Services coordinate password verification with the user and role
//! stores; they own no data themselves.

pub mod auth;

pub use auth::{AuthService, DEFAULT_STORE_TIMEOUT};
