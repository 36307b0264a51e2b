//! Password hashing and verification
//!
//! Stored hashes are self-describing; the scheme is picked from the prefix:
//!
//! - `$argon2id$...` (PHC string) - the default for new hashes
//! - `$2b$...` and the other bcrypt variants
//! - `{SSHA}...` - legacy salted SHA-1, verify-only unless asked for
//!
//! # Performance Considerations
//!
//! Argon2 and bcrypt are intentionally CPU-intensive. Async callers should
//! use the `_async` variants, which run on the blocking thread pool.

use super::legacy;
use crate::config::PasswordConfig;
use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier as _,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use realm_auth_shared::PasswordError;
use serde::{Deserialize, Serialize};

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Hash algorithm family of a stored hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashScheme {
    Argon2id,
    Bcrypt,
    LegacySsha,
}

impl HashScheme {
    /// Identify the scheme of a stored hash from its prefix
    pub fn detect(stored: &str) -> Option<Self> {
        if stored.starts_with("$argon2") {
            Some(HashScheme::Argon2id)
        } else if BCRYPT_PREFIXES.iter().any(|p| stored.starts_with(p)) {
            Some(HashScheme::Bcrypt)
        } else if stored.starts_with(legacy::PREFIX) {
            Some(HashScheme::LegacySsha)
        } else {
            None
        }
    }
}

/// Password verifier
///
/// Cheap to clone; holds only the hashing parameters.
#[derive(Debug, Clone)]
pub struct PasswordVerifier {
    default_scheme: HashScheme,
    argon2_params: Params,
    bcrypt_cost: u32,
    allow_legacy: bool,
}

impl Default for PasswordVerifier {
    fn default() -> Self {
        Self {
            default_scheme: HashScheme::Argon2id,
            argon2_params: Params::default(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            allow_legacy: true,
        }
    }
}

impl PasswordVerifier {
    pub fn from_config(config: &PasswordConfig) -> Result<Self, PasswordError> {
        if config.default_scheme == HashScheme::LegacySsha {
            return Err(PasswordError::Hashing(
                "legacy SHA-1 cannot be the default scheme".to_string(),
            ));
        }
        let argon2_params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| PasswordError::Hashing(format!("invalid argon2 parameters: {}", e)))?;

        Ok(Self {
            default_scheme: config.default_scheme,
            argon2_params,
            bcrypt_cost: config.bcrypt_cost,
            allow_legacy: config.allow_legacy,
        })
    }

    pub fn default_scheme(&self) -> HashScheme {
        self.default_scheme
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.argon2_params.clone())
    }

    /// Hash a password with the default scheme (blocking operation)
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        self.hash_with(self.default_scheme, plaintext)
    }

    /// Hash a password with an explicit scheme (blocking operation)
    pub fn hash_with(&self, scheme: HashScheme, plaintext: &str) -> Result<String, PasswordError> {
        match scheme {
            HashScheme::Argon2id => {
                let salt = SaltString::generate(&mut OsRng);
                self.argon2()
                    .hash_password(plaintext.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| PasswordError::Hashing(e.to_string()))
            }
            HashScheme::Bcrypt => bcrypt::hash(plaintext, self.bcrypt_cost)
                .map_err(|e| PasswordError::Hashing(e.to_string())),
            HashScheme::LegacySsha => Ok(legacy::hash(plaintext)),
        }
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(&self, plaintext: String) -> Result<String, PasswordError> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::Join(e.to_string()))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// `Ok(false)` means the password is wrong. An `Err` means the stored
    /// hash itself is unusable.
    pub fn check(&self, plaintext: &str, stored: &str) -> Result<bool, PasswordError> {
        match HashScheme::detect(stored).ok_or(PasswordError::UnknownScheme)? {
            HashScheme::Argon2id => {
                let parsed =
                    PasswordHash::new(stored).map_err(|e| PasswordError::Malformed(e.to_string()))?;
                if parsed.hash.is_none() || parsed.salt.is_none() {
                    return Err(PasswordError::Malformed(
                        "argon2 hash has no salt or digest".to_string(),
                    ));
                }
                match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
                    Ok(()) => Ok(true),
                    Err(PhcError::Password) => Ok(false),
                    Err(e) => Err(PasswordError::Malformed(e.to_string())),
                }
            }
            HashScheme::Bcrypt => bcrypt::verify(plaintext, stored)
                .map_err(|e| PasswordError::Malformed(e.to_string())),
            HashScheme::LegacySsha => {
                if !self.allow_legacy {
                    return Err(PasswordError::LegacyDisabled);
                }
                legacy::verify(plaintext, stored)
            }
        }
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn check_async(&self, plaintext: String, stored: String) -> Result<bool, PasswordError> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.check(&plaintext, &stored))
            .await
            .map_err(|e| PasswordError::Join(e.to_string()))?
    }

    /// Whether a stored hash should be replaced on the next successful login
    pub fn needs_rehash(&self, stored: &str) -> bool {
        let Some(scheme) = HashScheme::detect(stored) else {
            return true;
        };
        if scheme != self.default_scheme {
            return true;
        }
        match scheme {
            HashScheme::Argon2id => match PasswordHash::new(stored) {
                Ok(parsed) => {
                    parsed.algorithm.as_str() != Algorithm::Argon2id.as_str()
                        || Params::try_from(&parsed).map_or(true, |p| {
                            p.m_cost() != self.argon2_params.m_cost()
                                || p.t_cost() != self.argon2_params.t_cost()
                                || p.p_cost() != self.argon2_params.p_cost()
                        })
                }
                Err(_) => true,
            },
            HashScheme::Bcrypt => stored
                .get(4..6)
                .and_then(|cost| cost.parse::<u32>().ok())
                .map_or(true, |cost| cost != self.bcrypt_cost),
            HashScheme::LegacySsha => true,
        }
    }
}

#[cfg(test)]
pub(crate) fn fast_verifier() -> PasswordVerifier {
    PasswordVerifier {
        default_scheme: HashScheme::Argon2id,
        argon2_params: Params::new(1024, 1, 1, None).unwrap(),
        bcrypt_cost: 4,
        allow_legacy: true,
    }
}
