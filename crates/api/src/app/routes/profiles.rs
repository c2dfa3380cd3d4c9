use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
};

use profiles_auth::{Account, AccountChanges};
use profiles_core::AccountId;

use crate::app::dto::{self, FlagsRequest, ProfileRequest, SearchQuery};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/profile/", get(list_profiles).post(create_profile))
        .route(
            "/profile/:id/",
            get(get_profile)
                .put(replace_profile)
                .patch(update_profile)
                .delete(delete_profile),
        )
        .route("/profile/:id/flags/", patch(update_flags))
}

pub async fn list_profiles(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let items = services
        .accounts()
        .list(query.search.as_deref())
        .await?
        .iter()
        .map(dto::account_to_json)
        .collect::<Vec<_>>();
    Ok(Json(items).into_response())
}

/// Registration; open to anonymous callers.
pub async fn create_profile(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let profile = body.into_complete()?;
    let account = services
        .accounts()
        .create_account(&profile.email, &profile.name, Some(&profile.password))
        .await?;
    Ok((StatusCode::CREATED, Json(dto::account_to_json(&account))).into_response())
}

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let account = load(&services, &id).await?;
    Ok(Json(dto::account_to_json(&account)).into_response())
}

/// PUT: every writable field must be supplied.
pub async fn replace_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    method: Method,
    Path(id): Path<String>,
    body: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let mut account = load(&services, &id).await?;
    authz::authorize(&ctx, &method, &account)?;

    let Json(body) = body?;
    let changes = AccountChanges::from(body.into_complete()?);
    apply_changes(&services, &mut account, changes).await
}

/// PATCH: only the supplied fields change.
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    method: Method,
    Path(id): Path<String>,
    body: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let mut account = load(&services, &id).await?;
    authz::authorize(&ctx, &method, &account)?;

    let Json(body) = body?;
    apply_changes(&services, &mut account, body.into_changes()).await
}

pub async fn delete_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    method: Method,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let account = load(&services, &id).await?;
    authz::authorize(&ctx, &method, &account)?;

    services.delete_account(account.id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Superuser-only change of login/privilege flags.
pub async fn update_flags(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<FlagsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let actor = ctx.require()?;
    let mut account = load(&services, &id).await?;

    let Json(body) = body?;
    services
        .accounts()
        .set_flags(actor, &mut account, body.into())
        .await?;
    Ok(Json(dto::account_flags_to_json(&account)).into_response())
}

async fn load(services: &AppServices, raw_id: &str) -> Result<Account, ApiError> {
    let id: AccountId = raw_id.parse()?;
    Ok(services.accounts().get(id).await?)
}

async fn apply_changes(
    services: &AppServices,
    account: &mut Account,
    changes: AccountChanges,
) -> Result<Response, ApiError> {
    services.accounts().update_profile(account, changes).await?;
    Ok(Json(dto::account_to_json(account)).into_response())
}
