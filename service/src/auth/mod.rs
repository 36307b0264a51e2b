//! Password verification
//!
//! Argon2id for new hashes, bcrypt for hashes imported from other systems,
//! and verify-only support for legacy salted SHA-1.

pub mod legacy;
mod password;

pub use password::{HashScheme, PasswordVerifier};

#[cfg(test)]
pub(crate) use password::fast_verifier;
