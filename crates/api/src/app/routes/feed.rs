//! Status feed. Every request here must be authenticated; writes also need
//! ownership of the item.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;

use profiles_core::FeedItemId;
use profiles_feed::{FeedItem, FeedItemChanges, NewFeedItem};

use crate::app::dto::{self, FeedItemRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/feed/", get(list_feed).post(create_feed_item))
        .route(
            "/feed/:id/",
            get(get_feed_item)
                .put(replace_feed_item)
                .patch(update_feed_item)
                .delete(delete_feed_item),
        )
}

pub async fn list_feed(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    ctx.require()?;
    let items = services
        .feed()
        .list()
        .await?
        .iter()
        .map(dto::feed_item_to_json)
        .collect::<Vec<_>>();
    Ok(Json(items).into_response())
}

/// The new item always belongs to the requester, whatever the payload says.
pub async fn create_feed_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    body: Result<Json<FeedItemRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let requester = ctx.require()?;
    let Json(body) = body?;
    let text = body.required_status_text()?;

    let new = NewFeedItem::for_requester(requester, &text, Utc::now())?;
    let item = services.feed().insert(new).await?;
    tracing::info!(feed_item_id = %item.id, account_id = %item.owner, "feed item created");
    Ok((StatusCode::CREATED, Json(dto::feed_item_to_json(&item))).into_response())
}

pub async fn get_feed_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    ctx.require()?;
    let item = load(&services, &id).await?;
    Ok(Json(dto::feed_item_to_json(&item)).into_response())
}

pub async fn replace_feed_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    method: Method,
    Path(id): Path<String>,
    body: Result<Json<FeedItemRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    ctx.require()?;
    let mut item = load(&services, &id).await?;
    authz::authorize(&ctx, &method, &item)?;

    let Json(body) = body?;
    let changes = FeedItemChanges {
        status_text: Some(body.required_status_text()?),
    };
    apply_changes(&services, &mut item, changes).await
}

pub async fn update_feed_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    method: Method,
    Path(id): Path<String>,
    body: Result<Json<FeedItemRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    ctx.require()?;
    let mut item = load(&services, &id).await?;
    authz::authorize(&ctx, &method, &item)?;

    let Json(body) = body?;
    apply_changes(&services, &mut item, body.into_changes()).await
}

pub async fn delete_feed_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    method: Method,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    ctx.require()?;
    let item = load(&services, &id).await?;
    authz::authorize(&ctx, &method, &item)?;

    if !services.feed().delete(item.id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(feed_item_id = %item.id, "feed item deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn load(services: &AppServices, raw_id: &str) -> Result<FeedItem, ApiError> {
    let id: FeedItemId = raw_id.parse()?;
    services.feed().get(id).await?.ok_or(ApiError::NotFound)
}

async fn apply_changes(
    services: &AppServices,
    item: &mut FeedItem,
    changes: FeedItemChanges,
) -> Result<Response, ApiError> {
    item.apply(changes)?;
    services.feed().update(item).await?;
    tracing::info!(feed_item_id = %item.id, "feed item updated");
    Ok(Json(dto::feed_item_to_json(item)).into_response())
}
