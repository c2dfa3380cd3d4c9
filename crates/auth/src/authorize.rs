//! Object-level ownership authorization.
//!
//! Routes are reachable by everyone; whether a request may *mutate* a given
//! object is decided here, per object, from the requester and the object's
//! owner.

use core::str::FromStr;

use thiserror::Error;

use profiles_core::AccountId;

use crate::{Account, Principal};

/// HTTP verb, as far as authorization cares.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Safe methods never change server state.
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl core::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported request method '{0}'")]
pub struct UnsupportedMethod(pub String);

impl FromStr for RequestMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

/// A resource with exactly one owning account.
pub trait Owned {
    fn owner_id(&self) -> AccountId;
}

/// An account owns itself.
impl Owned for Account {
    fn owner_id(&self) -> AccountId {
        self.id
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication credentials were not provided")]
    NotAuthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),
}

/// Decide whether `requester` may apply `method` to `target`.
///
/// - Safe methods are always permitted, authenticated or not.
/// - Anything else requires an authenticated requester whose id equals the
///   target's owner id.
///
/// No IO, no state: the same inputs always give the same answer.
pub fn authorize_object<T>(
    requester: Option<&Principal>,
    method: RequestMethod,
    target: &T,
) -> Result<(), AuthzError>
where
    T: Owned + ?Sized,
{
    if method.is_safe() {
        return Ok(());
    }

    let Some(requester) = requester else {
        return Err(AuthzError::NotAuthenticated);
    };

    if requester.id() == target.owner_id() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(format!(
            "account {} may not {} a resource owned by account {}",
            requester.id(),
            method,
            target.owner_id()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(AccountId);

    impl Owned for Thing {
        fn owner_id(&self) -> AccountId {
            self.0
        }
    }

    const ALL: [RequestMethod; 7] = [
        RequestMethod::Get,
        RequestMethod::Head,
        RequestMethod::Options,
        RequestMethod::Post,
        RequestMethod::Put,
        RequestMethod::Patch,
        RequestMethod::Delete,
    ];

    #[test]
    fn non_owner_update_denied() {
        let requester = Principal::new(AccountId::new(1));
        let target = Thing(AccountId::new(2));
        let result = authorize_object(Some(&requester), RequestMethod::Put, &target);
        assert!(matches!(result, Err(AuthzError::Forbidden(_))));
    }

    #[test]
    fn non_owner_retrieve_permitted() {
        let requester = Principal::new(AccountId::new(1));
        let target = Thing(AccountId::new(2));
        assert!(authorize_object(Some(&requester), RequestMethod::Get, &target).is_ok());
    }

    #[test]
    fn owner_may_delete() {
        let requester = Principal::new(AccountId::new(3));
        assert!(authorize_object(Some(&requester), RequestMethod::Delete, &Thing(AccountId::new(3))).is_ok());
    }

    #[test]
    fn anonymous_mutation_needs_authentication() {
        let result = authorize_object(None, RequestMethod::Patch, &Thing(AccountId::new(1)));
        assert_eq!(result, Err(AuthzError::NotAuthenticated));
    }

    #[test]
    fn staff_flags_do_not_bypass_ownership() {
        let requester = Principal {
            account_id: AccountId::new(1),
            is_staff: true,
            is_superuser: true,
        };
        let result = authorize_object(Some(&requester), RequestMethod::Delete, &Thing(AccountId::new(2)));
        assert!(result.is_err());
    }

    #[test]
    fn method_names_round_trip() {
        for m in ALL {
            assert_eq!(m.as_str().parse::<RequestMethod>().unwrap(), m);
        }
        assert!("TRACE".parse::<RequestMethod>().is_err());
        assert_eq!("patch".parse::<RequestMethod>().unwrap(), RequestMethod::Patch);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn method() -> impl Strategy<Value = RequestMethod> {
            proptest::sample::select(ALL.to_vec())
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                max_global_rejects: 4096,
                ..ProptestConfig::default()
            })]

            /// Reads are permitted regardless of who owns the target.
            #[test]
            fn safe_methods_always_permitted(requester in any::<Option<i64>>(), owner in any::<i64>(), m in method()) {
                prop_assume!(m.is_safe());
                let principal = requester.map(|id| Principal::new(AccountId::new(id)));
                prop_assert!(authorize_object(principal.as_ref(), m, &Thing(AccountId::new(owner))).is_ok());
            }

            /// Writes succeed exactly when requester and owner match.
            #[test]
            fn mutations_require_ownership(requester in any::<i64>(), owner in any::<i64>(), m in method()) {
                prop_assume!(!m.is_safe());
                let principal = Principal::new(AccountId::new(requester));
                let result = authorize_object(Some(&principal), m, &Thing(AccountId::new(owner)));
                prop_assert_eq!(result.is_ok(), requester == owner);
            }
        }
    }
}
