use profiles_auth::Principal;

use crate::app::errors::ApiError;

/// Who is making the request.
///
/// Inserted by the auth middleware on every `/api` request; anonymous
/// requests carry `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Option<Principal>,
}

impl PrincipalContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// The principal, or a 401 for anonymous requests.
    pub fn require(&self) -> Result<&Principal, ApiError> {
        self.principal.as_ref().ok_or(ApiError::NotAuthenticated)
    }
}
