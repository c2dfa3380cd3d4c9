//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and cross-store operations
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use thiserror::Error;
use tower::ServiceBuilder;

use profiles_auth::{AccountError, PasswordError, PasswordHasher};
use profiles_core::StoreError;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("password hashing: {0}")]
    Hashing(#[from] PasswordError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("bootstrap superuser: {0}")]
    Bootstrap(#[from] AccountError),
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, StartupError> {
    let hasher = PasswordHasher::new(config.hashing)?;
    let params = hasher.params();
    tracing::info!(
        memory_kib = params.memory_kib,
        iterations = params.iterations,
        parallelism = params.parallelism,
        "password hashing configured"
    );
    let services = match &config.database_url {
        Some(url) => AppServices::postgres(url, hasher).await?,
        None => AppServices::in_memory(hasher),
    };

    if let Some(su) = &config.bootstrap_superuser {
        services.ensure_superuser(su).await?;
    }

    Ok(router(Arc::new(services)))
}

/// Router over already-built services.
pub fn router(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        services: services.clone(),
    };

    // Every /api route gets a PrincipalContext (possibly anonymous).
    let api = routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(services))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            )),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
}
