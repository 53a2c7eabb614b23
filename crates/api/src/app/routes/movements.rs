use std::sync::Arc;

use axum::{Json, extract::Extension, extract::Query, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// GET /movements?item_id=...
///
/// Movements are returned oldest first; the list is the append-only audit
/// trail, so order is part of the contract.
pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::MovementsQuery>,
) -> axum::response::Response {
    match services.ledger.movements(query.item_id).await {
        Ok(movements) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": movements.len(),
                "movements": movements
                    .into_iter()
                    .map(dto::movement_to_json)
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
