use std::fmt;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, Salt, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{rngs::OsRng, TryRngCore};

use crate::StoreError;

/// Argon2id password hashing.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl PasswordHasher {
    /// Cheapest parameters argon2 accepts. Only for tests and seeding fixtures.
    pub fn minimal() -> Result<Self, StoreError> {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None)
            .map_err(|e| StoreError::Hash(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, password: &str) -> Result<String, StoreError> {
        let mut saltBytes = [0u8; Salt::RECOMMENDED_LENGTH];
        OsRng
            .try_fill_bytes(&mut saltBytes)
            .map_err(|e| StoreError::Hash(e.to_string()))?;
        let salt = SaltString::encode_b64(&saltBytes).map_err(|e| StoreError::Hash(e.to_string()))?;

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| StoreError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// A malformed stored hash verifies as false.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self.argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::warn!("stored password hash is unreadable: {e}");
                false
            }
        }
    }
}
