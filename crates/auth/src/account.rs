//! Account entity, email normalization and field validation.

use profiles_core::{AccountId, DomainError, Entity, FieldErrors};

use crate::password::PasswordHash;

/// Upper bound shared by `email` and `name`.
pub const FIELD_MAX_LEN: usize = 255;

pub(crate) const MSG_BLANK: &str = "This field may not be blank.";
pub(crate) const MSG_EMAIL_REQUIRED: &str = "Users must have an email address";
pub(crate) const MSG_EMAIL_INVALID: &str = "Enter a valid email address.";
pub(crate) const MSG_EMAIL_TAKEN: &str = "user profile with this email already exists.";

// ─────────────────────────────────────────────────────────────────────────────
// Account
// ─────────────────────────────────────────────────────────────────────────────

/// A persisted identity capable of authenticating and owning resources.
///
/// # Invariants
/// - `email` is normalized (see [`normalize_email`]) and unique per store.
/// - `password_hash` never holds plaintext; accounts created without a
///   password carry an unusable hash.
/// - Accounts are only built by the store from a [`NewAccount`] produced by
///   the account manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub password_hash: PasswordHash,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Account {
    pub fn full_name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> AccountFlags {
        AccountFlags {
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        }
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }
}

impl core::fmt::Display for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.email)
    }
}

/// Validated account data that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password_hash: PasswordHash,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Login and privilege flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountFlags {
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Default for AccountFlags {
    fn default() -> Self {
        Self {
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

/// Partial flag update; `None` leaves the flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagChanges {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

/// Owner-editable profile changes; `None` leaves the field untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

impl core::fmt::Debug for AccountChanges {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountChanges")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalization / validation
// ─────────────────────────────────────────────────────────────────────────────

/// Canonicalize an email address.
///
/// Surrounding whitespace is dropped and the domain part is lowercased. The
/// local part is kept verbatim since mailbox names may be case-sensitive.
pub fn normalize_email(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}

/// Check the shape of an already-normalized email address.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > FIELD_MAX_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains('@') || domain.is_empty() {
        return false;
    }
    domain
        .split('.')
        .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}

/// Normalize and validate an email, recording problems under `email`.
pub(crate) fn clean_email(raw: &str, errors: &mut FieldErrors) -> Option<String> {
    if raw.trim().is_empty() {
        errors.add("email", MSG_EMAIL_REQUIRED);
        return None;
    }
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        errors.add("email", MSG_EMAIL_INVALID);
        return None;
    }
    Some(email)
}

/// Validate a display name, recording problems under `name`.
///
/// Surrounding whitespace is dropped before the length check and storage.
pub(crate) fn clean_name(raw: &str, errors: &mut FieldErrors) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        errors.add("name", MSG_BLANK);
        return None;
    }
    if name.chars().count() > FIELD_MAX_LEN {
        errors.add(
            "name",
            format!("Ensure this field has no more than {FIELD_MAX_LEN} characters."),
        );
        return None;
    }
    Some(name.to_string())
}

/// Reject blank passwords under `password`. The value itself is hashed
/// verbatim, whitespace included.
pub(crate) fn check_password(raw: &str, errors: &mut FieldErrors) -> bool {
    if raw.trim().is_empty() {
        errors.add("password", MSG_BLANK);
        return false;
    }
    true
}

pub(crate) fn email_taken() -> DomainError {
    DomainError::validation("email", MSG_EMAIL_TAKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_domain_only() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "Alice@example.com");
    }

    #[test]
    fn normalize_without_at_just_trims() {
        assert_eq!(normalize_email(" nobody "), "nobody");
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("ops@localhost"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@x..com"));
        assert!(!is_valid_email("a@@x.com"));
    }

    #[test]
    fn blank_email_reports_required() {
        let mut errors = FieldErrors::new();
        assert!(clean_email("   ", &mut errors).is_none());
        assert_eq!(errors.get("email").unwrap(), [MSG_EMAIL_REQUIRED]);
    }

    #[test]
    fn long_name_rejected() {
        let mut errors = FieldErrors::new();
        let name = "n".repeat(FIELD_MAX_LEN + 1);
        assert!(clean_name(&name, &mut errors).is_none());
        assert!(errors.get("name").is_some());
    }

    #[test]
    fn name_is_trimmed_before_length_check() {
        let mut errors = FieldErrors::new();
        let padded = format!("  {}  ", "n".repeat(FIELD_MAX_LEN));
        assert_eq!(clean_name(&padded, &mut errors), Some("n".repeat(FIELD_MAX_LEN)));
        assert!(errors.is_empty());
    }

    #[test]
    fn blank_password_reports_blank() {
        let mut errors = FieldErrors::new();
        assert!(!check_password("", &mut errors));
        assert!(!check_password("   ", &mut errors));
        assert!(check_password(" pw ", &mut errors));
        assert_eq!(errors.get("password").unwrap(), [MSG_BLANK, MSG_BLANK]);
    }

    #[test]
    fn changes_debug_hides_password() {
        let changes = AccountChanges {
            password: Some("hunter2".into()),
            ..Default::default()
        };
        let rendered = format!("{changes:?}");
        assert!(!rendered.contains("hunter2"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Normalizing twice changes nothing.
            #[test]
            fn normalize_is_idempotent(local in "[A-Za-z0-9._+]{1,20}", domain in "[A-Za-z0-9]{1,12}\\.[A-Za-z]{2,6}") {
                let once = normalize_email(&format!(" {local}@{domain} "));
                prop_assert_eq!(normalize_email(&once), once.clone());
                prop_assert!(once.starts_with(&local));
            }
        }
    }
}
