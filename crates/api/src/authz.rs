//! Object-level authorization at the HTTP boundary.
//!
//! Handlers load the target first, then call [`authorize`] with the request
//! method; the decision itself lives in `profiles_auth::authorize_object`.

use axum::http::Method;

use profiles_auth::{Owned, RequestMethod, authorize_object};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub fn request_method(method: &Method) -> Result<RequestMethod, ApiError> {
    method
        .as_str()
        .parse()
        .map_err(|_| ApiError::MethodNotAllowed(method.to_string()))
}

/// Check that the requester may apply `method` to `target`.
pub fn authorize<T>(ctx: &PrincipalContext, method: &Method, target: &T) -> Result<(), ApiError>
where
    T: Owned + ?Sized,
{
    let method = request_method(method)?;
    authorize_object(ctx.principal(), method, target)?;
    Ok(())
}
