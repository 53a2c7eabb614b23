use axum::{Router, routing::get};

pub mod allocations;
pub mod capabilities;
pub mod movements;
pub mod stock;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/allocations", get(allocations::list_allocations))
        .route("/movements", get(movements::list_movements))
        .route(
            "/capabilities/:role/:capability",
            get(capabilities::check_capability),
        )
        .nest("/stock", stock::router())
}
