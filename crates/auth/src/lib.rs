//! `profiles-auth`: accounts, password hashing, tokens and ownership checks.
//!
//! This crate is decoupled from HTTP and from any concrete storage engine.

pub mod account;
pub mod authorize;
pub mod manager;
pub mod password;
pub mod principal;
pub mod store;
pub mod token;

pub use account::{
    Account, AccountChanges, AccountFlags, FIELD_MAX_LEN, FlagChanges, NewAccount, is_valid_email,
    normalize_email,
};
pub use authorize::{AuthzError, Owned, RequestMethod, authorize_object};
pub use manager::{AccountError, AccountManager};
pub use password::{HashingParams, PasswordError, PasswordHash, PasswordHasher};
pub use principal::Principal;
pub use store::{AccountStore, TokenStore};
pub use token::{AuthToken, TOKEN_KEY_LEN, TokenKey};
