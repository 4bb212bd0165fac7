//! Argon2id password hashing.
//!
//! Hashes are stored in PHC string form (`$argon2id$v=19$...`), so the
//! parameters used at sign-up travel with the hash and verification keeps
//! working if the configured cost changes later.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::domain::Password;

const SALT_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    /// Hashing failed, e.g. because of invalid parameters.
    #[error("failed to hash password: {message}")]
    Hash { message: String },
    /// A stored hash could not be parsed.
    #[error("stored password hash is malformed: {message}")]
    Malformed { message: String },
}

/// Argon2id hasher with configurable cost.
#[derive(Debug, Clone, Default)]
pub struct PasswordHashing {
    params: Params,
}

impl PasswordHashing {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Minimum-cost parameters for tests and local tooling.
    pub fn low_cost() -> Self {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, 1, None)
            .unwrap_or_default();
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &Password) -> Result<String, PasswordHashError> {
        let mut salt = [0_u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(|err| PasswordHashError::Hash {
            message: err.to_string(),
        })?;
        self.argon2()
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::Hash {
                message: err.to_string(),
            })
    }

    /// Check `candidate` against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on a mismatch; errors are reserved for hashes that
    /// cannot be parsed.
    pub fn verify(&self, candidate: &str, stored: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(stored).map_err(|err| PasswordHashError::Malformed {
            message: err.to_string(),
        })?;
        match self.argon2().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::Malformed {
                message: err.to_string(),
            }),
        }
    }
}
