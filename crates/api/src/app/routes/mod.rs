use axum::Router;

pub mod feed;
pub mod hello;
pub mod login;
pub mod profiles;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .merge(hello::router())
        .merge(login::router())
        .merge(profiles::router())
        .merge(feed::router())
}
