use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use profiles_auth::{AccountError, AuthzError};
use profiles_core::{DomainError, FieldErrors, StoreError};

pub const MSG_NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const MSG_FORBIDDEN: &str = "You do not have permission to perform this action.";
pub const MSG_BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";
pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_BLANK: &str = "This field may not be blank.";

/// Every way a request can fail, mapped onto one HTTP response each.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found")]
    NotFound,

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "validation_error",
                    "message": fields.to_string(),
                    "fields": fields,
                })),
            )
                .into_response(),
            Self::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "parse_error", msg),
            Self::NotAuthenticated => unauthorized("not_authenticated", MSG_NOT_AUTHENTICATED),
            Self::InvalidToken(msg) => unauthorized("invalid_token", msg),
            Self::Forbidden(detail) => {
                tracing::warn!(%detail, "request denied");
                json_error(StatusCode::FORBIDDEN, "forbidden", MSG_FORBIDDEN)
            }
            Self::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "Not found."),
            Self::MethodNotAllowed(method) => json_error(
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                format!("Method \"{method}\" not allowed."),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal error")
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(fields) => Self::Validation(fields),
            // Ids are path segments; a malformed one simply matches nothing.
            DomainError::InvalidId(_) | DomainError::NotFound => Self::NotFound,
            DomainError::Forbidden(msg) => Self::Forbidden(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::UniqueViolation { field } => Self::field(field, "already exists"),
            StoreError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Domain(e) => e.into(),
            AccountError::InvalidCredentials => Self::field("non_field_errors", MSG_BAD_CREDENTIALS),
            AccountError::Password(e) => Self::Internal(e.to_string()),
            AccountError::Store(e) => e.into(),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotAuthenticated => Self::NotAuthenticated,
            AuthzError::Forbidden(msg) => Self::Forbidden(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn unauthorized(code: &'static str, message: &str) -> Response {
    let mut response = json_error(StatusCode::UNAUTHORIZED, code, message);
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
    response
}
