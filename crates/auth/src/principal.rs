use profiles_core::AccountId;

use crate::Account;

/// An authenticated requester, resolved from a token.
///
/// Carries only what authorization decisions need; the full account stays in
/// the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: AccountId,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Principal {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            is_staff: false,
            is_superuser: false,
        }
    }

    pub fn id(&self) -> AccountId {
        self.account_id
    }
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
        }
    }
}
