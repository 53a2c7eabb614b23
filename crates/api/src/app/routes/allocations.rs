use std::sync::Arc;

use axum::{Json, extract::Extension, extract::Query, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// GET /allocations?user_id=...
pub async fn list_allocations(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::AllocationsQuery>,
) -> axum::response::Response {
    match services.ledger.allocations(query.user_id).await {
        Ok(allocations) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": allocations.len(),
                "allocations": allocations
                    .into_iter()
                    .map(dto::allocation_to_json)
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
