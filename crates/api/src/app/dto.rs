use chrono::SecondsFormat;
use serde::Deserialize;
use serde_json::{Value, json};

use profiles_auth::{Account, AccountChanges, FlagChanges};
use profiles_core::FieldErrors;
use profiles_feed::{FeedItem, FeedItemChanges};

use crate::app::errors::{ApiError, MSG_BLANK, MSG_REQUIRED};

/// Longest name the hello endpoints accept.
pub const HELLO_NAME_MAX_LEN: usize = 10;

// -------------------------
// Request DTOs
// -------------------------
//
// Fields are optional at the serde level so missing ones are reported per
// field instead of as one parse failure.

#[derive(Debug, Deserialize)]
pub struct HelloRequest {
    pub name: Option<String>,
}

impl HelloRequest {
    /// The name with surrounding whitespace removed.
    pub fn validated_name(self) -> Result<String, ApiError> {
        let Some(raw) = self.name else {
            return Err(ApiError::field("name", MSG_REQUIRED));
        };
        let name = raw.trim();
        if name.is_empty() {
            return Err(ApiError::field("name", MSG_BLANK));
        }
        if name.chars().count() > HELLO_NAME_MAX_LEN {
            return Err(ApiError::field(
                "name",
                format!("Ensure this field has no more than {HELLO_NAME_MAX_LEN} characters."),
            ));
        }
        Ok(name.to_string())
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// `(email, password)`, both required and non-blank.
    pub fn credentials(self) -> Result<(String, String), ApiError> {
        let mut errors = FieldErrors::new();
        let username = require_non_blank(&mut errors, "username", self.username);
        let password = require_non_blank(&mut errors, "password", self.password);
        match (username, password) {
            (Some(u), Some(p)) => Ok((u, p)),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

/// Account payload. `password` is write-only.
#[derive(Deserialize, Default)]
pub struct ProfileRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

pub struct NewProfile {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl ProfileRequest {
    /// Every field must be present (create and full update).
    pub fn into_complete(self) -> Result<NewProfile, ApiError> {
        let mut errors = FieldErrors::new();
        let email = require(&mut errors, "email", self.email);
        let name = require(&mut errors, "name", self.name);
        let password = require(&mut errors, "password", self.password);
        match (email, name, password) {
            (Some(email), Some(name), Some(password)) => Ok(NewProfile {
                email,
                name,
                password,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }

    pub fn into_changes(self) -> AccountChanges {
        AccountChanges {
            email: self.email,
            name: self.name,
            password: self.password,
        }
    }
}

impl From<NewProfile> for AccountChanges {
    fn from(p: NewProfile) -> Self {
        Self {
            email: Some(p.email),
            name: Some(p.name),
            password: Some(p.password),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FlagsRequest {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl From<FlagsRequest> for FlagChanges {
    fn from(r: FlagsRequest) -> Self {
        Self {
            is_active: r.is_active,
            is_staff: r.is_staff,
            is_superuser: r.is_superuser,
        }
    }
}

/// Feed payload. `id`, `user_profile` and `created_on` are read-only and
/// ignored when sent.
#[derive(Debug, Deserialize)]
pub struct FeedItemRequest {
    pub status_text: Option<String>,
}

impl FeedItemRequest {
    pub fn required_status_text(self) -> Result<String, ApiError> {
        self.status_text
            .ok_or_else(|| ApiError::field("status_text", MSG_REQUIRED))
    }

    pub fn into_changes(self) -> FeedItemChanges {
        FeedItemChanges {
            status_text: self.status_text,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

fn require(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    if value.is_none() {
        errors.add(field, MSG_REQUIRED);
    }
    value
}

fn require_non_blank(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    let value = require(errors, field, value)?;
    if value.trim().is_empty() {
        errors.add(field, MSG_BLANK);
        return None;
    }
    Some(value)
}

// -------------------------
// Response mapping
// -------------------------

pub fn account_to_json(a: &Account) -> Value {
    json!({
        "id": a.id.get(),
        "email": a.email,
        "name": a.name,
    })
}

/// Account view including login/privilege flags (superuser endpoint).
pub fn account_flags_to_json(a: &Account) -> Value {
    json!({
        "id": a.id.get(),
        "email": a.email,
        "name": a.name,
        "is_active": a.is_active,
        "is_staff": a.is_staff,
        "is_superuser": a.is_superuser,
    })
}

pub fn feed_item_to_json(item: &FeedItem) -> Value {
    json!({
        "id": item.id.get(),
        "user_profile": item.owner.get(),
        "status_text": item.status_text,
        "created_on": item.created_on.to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}
