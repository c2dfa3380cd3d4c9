//! One-way password hashing (Argon2id, PHC string format).

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHasher as _, PasswordVerifier as _, SaltString},
};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

/// Marker prefix for hashes that can never verify.
const UNUSABLE_PREFIX: char = '!';

/// Stored password hash.
///
/// Either an Argon2 PHC string or an unusable marker. `Debug` never prints
/// the hash itself.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Rehydrate a hash read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// A hash that no password verifies against.
    pub fn unusable() -> Self {
        let mut bytes = [0u8; 20];
        OsRng.fill_bytes(&mut bytes);
        Self(format!("{UNUSABLE_PREFIX}{}", hex::encode(bytes)))
    }

    pub fn is_usable(&self) -> bool {
        !self.0.starts_with(UNUSABLE_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_usable() {
            f.write_str("PasswordHash(<redacted>)")
        } else {
            f.write_str("PasswordHash(<unusable>)")
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies passwords with a fixed set of Argon2id parameters.
///
/// Verification reads the parameters embedded in the stored PHC string, so
/// changing the cost only affects newly written hashes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    params: HashingParams,
}

impl PasswordHasher {
    pub fn new(params: HashingParams) -> Result<Self, PasswordError> {
        let argon_params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params),
            params,
        })
    }

    pub fn params(&self) -> HashingParams {
        self.params
    }

    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;
        Ok(PasswordHash(phc.to_string()))
    }

    /// Spend one hash worth of work on `plaintext` and report no match.
    ///
    /// Used when there is no stored hash to check against, so a failed login
    /// for an unknown account costs about as much as one with a wrong password.
    pub fn verify_missing(&self, plaintext: &str) -> bool {
        if let Err(err) = self.hash(plaintext) {
            tracing::warn!(error = %err, "dummy password hash failed");
        }
        false
    }

    /// `true` iff `plaintext` matches a usable `hash`.
    pub fn verify(&self, plaintext: &str, hash: &PasswordHash) -> bool {
        if !hash.is_usable() {
            return false;
        }
        let Ok(parsed) = argon2::PasswordHash::new(hash.as_str()) else {
            tracing::warn!("stored password hash is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
            params: HashingParams::default(),
        }
    }
}

impl core::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", &self.params)
            .finish()
    }
}
