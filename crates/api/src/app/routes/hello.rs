//! Demo endpoints: one hand-mapped view and one resource-style set.
//!
//! Neither touches a store; they only echo what was called.

use axum::{
    Json, Router,
    extract::{Path, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::app::dto::HelloRequest;
use crate::app::errors::ApiError;

const API_VIEW_FEATURES: [&str; 4] = [
    "Uses HTTP methods as functions (get,post,put,patch,delete)",
    "It is similar to traditional django views",
    "Gives you control over application logic",
    "Is mapped manually to urls",
];

const VIEW_SET_FEATURES: [&str; 3] = [
    "Users actions list, create, retrieve, update, partial_update",
    "Automatically maps to urls using routers",
    "Provides more functionality with less code",
];

pub fn router() -> Router {
    Router::new()
        .route(
            "/hello/",
            get(view_get)
                .post(view_post)
                .put(view_put)
                .patch(view_patch)
                .delete(view_delete),
        )
        .route("/hello_viewset/", get(set_list).post(set_create))
        .route(
            "/hello_viewset/:pk/",
            get(set_retrieve)
                .put(set_update)
                .patch(set_partial_update)
                .delete(set_destroy),
        )
}

// -------------------------
// Hand-mapped view
// -------------------------

pub async fn view_get() -> Response {
    Json(json!({
        "msg": "Hello world in api!",
        "an_apiview": API_VIEW_FEATURES,
    }))
    .into_response()
}

pub async fn view_post(body: Result<Json<HelloRequest>, JsonRejection>) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let name = body.validated_name()?;
    Ok(Json(json!({ "message": format!("Hello {name} !") })).into_response())
}

pub async fn view_put() -> Response {
    Json(json!({ "method": "PUT" })).into_response()
}

pub async fn view_patch() -> Response {
    Json(json!({ "method": "Patch" })).into_response()
}

pub async fn view_delete() -> Response {
    Json(json!({ "method": "Delete" })).into_response()
}

// -------------------------
// Resource-style set
// -------------------------

pub async fn set_list() -> Response {
    Json(json!({
        "message": "Hello !",
        "a_viewset": VIEW_SET_FEATURES,
    }))
    .into_response()
}

pub async fn set_create(body: Result<Json<HelloRequest>, JsonRejection>) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let name = body.validated_name()?;
    Ok(Json(json!({ "message": format!("Hello {name}!") })).into_response())
}

pub async fn set_retrieve(Path(_pk): Path<String>) -> Response {
    Json(json!({ "http_method": "GET" })).into_response()
}

pub async fn set_update(Path(_pk): Path<String>) -> Response {
    Json(json!({ "http_method": "PUT" })).into_response()
}

pub async fn set_partial_update(Path(_pk): Path<String>) -> Response {
    Json(json!({ "http_method": "PATCH" })).into_response()
}

pub async fn set_destroy(Path(_pk): Path<String>) -> Response {
    Json(json!({ "http_method": "DELETE" })).into_response()
}
