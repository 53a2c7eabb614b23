use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use promostock_core::StockItemId;
use promostock_inventory::{NewStockItem, TransferRequest};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/transfers", post(create_transfer))
        .route("/items", post(create_item).get(list_items))
        .route("/items/:id", get(get_item))
        .route("/items/:id/restock", post(restock_item))
        .route("/items/:id/write-off", post(write_off_item))
}

/// POST /stock/transfers
///
/// The acting user comes from the token, never from the body; `moved_by` in
/// the recorded movement is always the authenticated caller.
pub async fn create_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::TransferBody>,
) -> axum::response::Response {
    let request = TransferRequest {
        item_id: body.item_id,
        from_user: body.from_user,
        to_user: body.to_user,
        quantity: body.quantity,
        moved_by: actor.user_id(),
        notes: body.notes,
    };

    match services.ledger.transfer(actor.actor(), request).await {
        Ok(movement) => (
            StatusCode::CREATED,
            Json(dto::movement_to_json(movement)),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let new_item = NewStockItem {
        name: body.name,
        category_id: body.category_id,
        description: body.description,
        quantity: body.quantity,
    };

    match services
        .ledger
        .create_item(actor.actor(), body.id, new_item)
        .await
    {
        Ok(item) => (StatusCode::CREATED, Json(dto::stock_item_to_json(item))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.ledger.stock_items().await {
        Ok(items) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": items.len(),
                "items": items
                    .into_iter()
                    .map(dto::stock_item_to_json)
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let item_id: StockItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id");
        }
    };

    match services.ledger.stock_item(item_id).await {
        Ok(Some(item)) => (StatusCode::OK, Json(dto::stock_item_to_json(item))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn restock_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdjustQuantityRequest>,
) -> axum::response::Response {
    let item_id: StockItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id");
        }
    };

    match services
        .ledger
        .restock(actor.actor(), item_id, body.quantity)
        .await
    {
        Ok(item) => (StatusCode::OK, Json(dto::stock_item_to_json(item))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn write_off_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdjustQuantityRequest>,
) -> axum::response::Response {
    let item_id: StockItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id");
        }
    };

    match services
        .ledger
        .write_off(actor.actor(), item_id, body.quantity)
        .await
    {
        Ok(item) => (StatusCode::OK, Json(dto::stock_item_to_json(item))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
