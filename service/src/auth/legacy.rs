//! Legacy salted SHA-1 hashes
//!
//! Stored as `{SSHA}` followed by base64 of the 20-byte digest of
//! `password || salt`, then the salt itself (RFC 2307 layout). Kept for
//! verifying hashes written by older deployments; new hashes never use it
//! unless a caller asks for it explicitly.

use argon2::password_hash::{
    rand_core::{OsRng, RngCore},
    Output,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use realm_auth_shared::PasswordError;
use sha1::{Digest, Sha1};

pub const PREFIX: &str = "{SSHA}";

const DIGEST_LEN: usize = 20;
const SALT_LEN: usize = 8;

fn digest(plaintext: &str, salt: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha1::new();
    hasher.update(plaintext.as_bytes());
    hasher.update(salt);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Hash with a caller-chosen salt
pub fn hash_with_salt(plaintext: &str, salt: &[u8]) -> String {
    let mut raw = digest(plaintext, salt).to_vec();
    raw.extend_from_slice(salt);
    format!("{}{}", PREFIX, STANDARD.encode(raw))
}

/// Hash with a fresh random salt
pub fn hash(plaintext: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    hash_with_salt(plaintext, &salt)
}

/// Verify a plaintext password against an `{SSHA}` hash
///
/// Digests are compared through `password_hash::Output`, whose equality is
/// constant-time.
pub fn verify(plaintext: &str, stored: &str) -> Result<bool, PasswordError> {
    let encoded = stored
        .strip_prefix(PREFIX)
        .ok_or(PasswordError::UnknownScheme)?;
    let raw = STANDARD
        .decode(encoded.trim())
        .map_err(|e| PasswordError::Malformed(format!("invalid base64: {}", e)))?;
    if raw.len() <= DIGEST_LEN {
        return Err(PasswordError::Malformed("salt is missing".to_string()));
    }

    let (expected, salt) = raw.split_at(DIGEST_LEN);
    let actual = digest(plaintext, salt);

    let expected = Output::new(expected).map_err(|e| PasswordError::Malformed(e.to_string()))?;
    let actual = Output::new(&actual).map_err(|e| PasswordError::Malformed(e.to_string()))?;
    Ok(expected == actual)
}
