use serde::Deserialize;

use promostock_core::{CategoryId, StockItemId, UserId};
use promostock_inventory::{Allocation, Movement, StockItem};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct TransferBody {
    pub item_id: StockItemId,
    pub from_user: Option<UserId>,
    pub to_user: Option<UserId>,
    pub quantity: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Optional client-supplied id; the server assigns one when absent.
    pub id: Option<StockItemId>,
    pub name: String,
    pub category_id: CategoryId,
    pub description: Option<String>,
    /// Opening pool quantity; defaults to zero.
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdjustQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct AllocationsQuery {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct MovementsQuery {
    pub item_id: Option<StockItemId>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn stock_item_to_json(item: StockItem) -> serde_json::Value {
    serde_json::json!({
        "id": item.id.to_string(),
        "name": item.name,
        "category_id": item.category_id.to_string(),
        "description": item.description,
        "quantity": item.quantity,
        "created_by": item.created_by.to_string(),
        "created_at": item.created_at.to_rfc3339(),
        "updated_at": item.updated_at.to_rfc3339(),
    })
}

pub fn allocation_to_json(allocation: Allocation) -> serde_json::Value {
    serde_json::json!({
        "id": allocation.id.to_string(),
        "user_id": allocation.user_id.to_string(),
        "stock_item_id": allocation.stock_item_id.to_string(),
        "quantity": allocation.quantity,
        "allocated_by": allocation.allocated_by.to_string(),
        "allocated_at": allocation.allocated_at.to_rfc3339(),
    })
}

pub fn movement_to_json(movement: Movement) -> serde_json::Value {
    serde_json::json!({
        "id": movement.id.to_string(),
        "stock_item_id": movement.stock_item_id.to_string(),
        "from_user_id": movement.from_user_id.map(|id| id.to_string()),
        "to_user_id": movement.to_user_id.map(|id| id.to_string()),
        "quantity": movement.quantity,
        "moved_by": movement.moved_by.to_string(),
        "notes": movement.notes,
        "moved_at": movement.moved_at.to_rfc3339(),
    })
}
