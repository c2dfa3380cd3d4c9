use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

use crate::app::dto::LoginRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/login/", post(login))
}

/// Exchange `{username, password}` for the account's token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let (email, password) = body.credentials()?;
    let token = services.login(&email, &password).await?;
    Ok(Json(json!({ "token": token.key.as_str() })).into_response())
}
