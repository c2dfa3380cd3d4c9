//! Opaque login tokens.

use chrono::{DateTime, Utc};
use rand::{RngCore, rngs::OsRng};

use profiles_core::AccountId;

/// Length of a token key in hex characters.
pub const TOKEN_KEY_LEN: usize = 40;

/// Secret token key (20 random bytes, lowercase hex).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenKey(String);

impl TokenKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_KEY_LEN / 2];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Rehydrate a key read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "TokenKey({prefix}…)")
    }
}

/// Token issued to an account at login.
///
/// There is at most one token per account; logging in again returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub key: TokenKey,
    pub account_id: AccountId,
    pub created: DateTime<Utc>,
}

impl AuthToken {
    pub fn issue(account_id: AccountId, now: DateTime<Utc>) -> Self {
        Self {
            key: TokenKey::generate(),
            account_id,
            created: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_hex_and_distinct() {
        let a = TokenKey::generate();
        let b = TokenKey::generate();
        assert_eq!(a.as_str().len(), TOKEN_KEY_LEN);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn debug_shows_prefix_only() {
        let key = TokenKey::from_stored("0123456789abcdef0123456789abcdef01234567");
        assert_eq!(format!("{key:?}"), "TokenKey(012345…)");
    }
}
