use chrono::{DateTime, Utc};

use profiles_auth::{Owned, Principal};
use profiles_core::{AccountId, DomainError, DomainResult, Entity, FeedItemId};

/// Maximum length of a status update, in characters.
pub const STATUS_TEXT_MAX_LEN: usize = 255;

/// A status update owned by exactly one account.
///
/// `owner` and `created_on` are fixed at creation; only `status_text` changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: FeedItemId,
    pub owner: AccountId,
    pub status_text: String,
    pub created_on: DateTime<Utc>,
}

impl FeedItem {
    pub fn apply(&mut self, changes: FeedItemChanges) -> DomainResult<()> {
        if let Some(text) = changes.status_text {
            self.status_text = clean_status_text(&text)?;
        }
        Ok(())
    }
}

impl Entity for FeedItem {
    type Id = FeedItemId;

    fn id(&self) -> FeedItemId {
        self.id
    }
}

impl Owned for FeedItem {
    fn owner_id(&self) -> AccountId {
        self.owner
    }
}

impl core::fmt::Display for FeedItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.status_text)
    }
}

/// A feed item ready to be inserted (no id yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedItem {
    pub owner: AccountId,
    pub status_text: String,
    pub created_on: DateTime<Utc>,
}

impl NewFeedItem {
    /// Build a new item on behalf of an authenticated requester.
    ///
    /// The owner is always the requester; callers have no way to pass one in.
    pub fn for_requester(
        requester: &Principal,
        status_text: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            owner: requester.id(),
            status_text: clean_status_text(status_text)?,
            created_on: now,
        })
    }
}

/// Owner-editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItemChanges {
    pub status_text: Option<String>,
}

/// Trims surrounding whitespace, then checks blank and length.
fn clean_status_text(raw: &str) -> DomainResult<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DomainError::validation("status_text", "This field may not be blank."));
    }
    if text.chars().count() > STATUS_TEXT_MAX_LEN {
        return Err(DomainError::validation(
            "status_text",
            format!("Ensure this field has no more than {STATUS_TEXT_MAX_LEN} characters."),
        ));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(owner: i64) -> FeedItem {
        FeedItem {
            id: FeedItemId::new(1),
            owner: AccountId::new(owner),
            status_text: "first".into(),
            created_on: Utc::now(),
        }
    }

    #[test]
    fn owner_comes_from_requester() {
        let requester = Principal::new(AccountId::new(7));
        let new = NewFeedItem::for_requester(&requester, "hi", Utc::now()).unwrap();
        assert_eq!(new.owner, AccountId::new(7));
        assert_eq!(new.status_text, "hi");
    }

    #[test]
    fn blank_status_rejected() {
        let requester = Principal::new(AccountId::new(1));
        let err = NewFeedItem::for_requester(&requester, "  ", Utc::now()).unwrap_err();
        let DomainError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert!(fields.get("status_text").is_some());
    }

    #[test]
    fn status_is_trimmed() {
        let requester = Principal::new(AccountId::new(1));
        let new = NewFeedItem::for_requester(&requester, "  hello world \n", Utc::now()).unwrap();
        assert_eq!(new.status_text, "hello world");

        let mut it = item(1);
        let padded = format!("  {}  ", "x".repeat(STATUS_TEXT_MAX_LEN));
        it.apply(FeedItemChanges { status_text: Some(padded) }).unwrap();
        assert_eq!(it.status_text, "x".repeat(STATUS_TEXT_MAX_LEN));
    }

    #[test]
    fn overlong_status_rejected() {
        let mut it = item(1);
        let result = it.apply(FeedItemChanges {
            status_text: Some("x".repeat(STATUS_TEXT_MAX_LEN + 1)),
        });
        assert!(result.is_err());
        assert_eq!(it.status_text, "first");
    }

    #[test]
    fn apply_keeps_owner_and_timestamp() {
        let mut it = item(3);
        let created = it.created_on;
        it.apply(FeedItemChanges {
            status_text: Some("edited".into()),
        })
        .unwrap();
        assert_eq!(it.status_text, "edited");
        assert_eq!(it.owner, AccountId::new(3));
        assert_eq!(it.created_on, created);
    }

    #[test]
    fn owned_by_owner_field() {
        assert_eq!(item(9).owner_id(), AccountId::new(9));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Whatever the requester, the new item belongs to them.
            #[test]
            fn created_items_belong_to_requester(requester in any::<i64>(), text in "[a-z]{1,40}") {
                let principal = Principal::new(AccountId::new(requester));
                let new = NewFeedItem::for_requester(&principal, &text, Utc::now()).unwrap();
                prop_assert_eq!(new.owner, AccountId::new(requester));
            }
        }
    }
}
