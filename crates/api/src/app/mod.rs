//! HTTP API application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: ledger service wiring (store selection, schema setup)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//!
//! Everything except `/health` sits behind the bearer-token middleware.

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services().await?);
    Ok(build_app_with(services, jwt_secret))
}

/// Router over explicit services; tests use this to control the backend.
pub fn build_app_with(services: Arc<services::AppServices>, jwt_secret: String) -> Router {
    let jwt = Arc::new(promostock_auth::Hs256JwtValidator::new(
        jwt_secret.into_bytes(),
    ));
    let auth_state = middleware::AuthState { jwt };

    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
