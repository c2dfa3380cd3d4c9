use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use profiles_auth::Principal;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Resolve the `Authorization` header into a [`PrincipalContext`].
///
/// A missing header (or a scheme other than `Token`/`Bearer`) yields an
/// anonymous context; a malformed or unknown token is rejected with 401 on
/// every route, public or not.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = match resolve(&state, req.headers()).await {
        Ok(ctx) => ctx,
        Err(e) => return e.into_response(),
    };
    req.extensions_mut().insert(ctx);
    next.run(req).await
}

async fn resolve(state: &AuthState, headers: &HeaderMap) -> Result<PrincipalContext, ApiError> {
    let Some(key) = extract_token(headers)? else {
        return Ok(PrincipalContext::anonymous());
    };

    let account = state
        .services
        .resolve_token(key)
        .await?
        .ok_or(ApiError::InvalidToken("Invalid token."))?;

    if !account.is_active {
        return Err(ApiError::InvalidToken("User inactive or deleted."));
    }

    Ok(PrincipalContext::authenticated(Principal::from(&account)))
}

/// Pull the key out of `Authorization: Token <key>` (or `Bearer <key>`).
fn extract_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let header = header
        .to_str()
        .map_err(|_| ApiError::InvalidToken("Invalid token header. Token string should not contain invalid characters."))?;

    let mut parts = header.split_whitespace();
    let Some(scheme) = parts.next() else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(Some(key)),
        (None, _) => Err(ApiError::InvalidToken("Invalid token header. No credentials provided.")),
        (Some(_), Some(_)) => Err(ApiError::InvalidToken(
            "Invalid token header. Token string should not contain spaces.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        map
    }

    #[test]
    fn no_header_is_anonymous() {
        assert_eq!(extract_token(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn token_and_bearer_schemes() {
        assert_eq!(extract_token(&headers("Token abc")).unwrap(), Some("abc"));
        assert_eq!(extract_token(&headers("bearer abc")).unwrap(), Some("abc"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        assert_eq!(extract_token(&headers("Basic dXNlcjpwdw==")).unwrap(), None);
    }

    #[test]
    fn malformed_token_headers_rejected() {
        assert!(extract_token(&headers("Token")).is_err());
        assert!(extract_token(&headers("Token a b")).is_err());
    }
}
