use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use promostock_core::{MovementId, StockItemId, UserId};

/// A completed transfer, as recorded in the append-only audit ledger.
///
/// `None` on either endpoint is the central pool. Rows are never updated or
/// deleted; no such operation exists anywhere in the codebase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub stock_item_id: StockItemId,
    /// Source endpoint; `None` is the central pool.
    pub from_user_id: Option<UserId>,
    /// Destination endpoint; `None` is the central pool.
    pub to_user_id: Option<UserId>,
    /// Moved quantity; always positive.
    pub quantity: i64,
    pub moved_by: UserId,
    pub notes: Option<String>,
    pub moved_at: DateTime<Utc>,
}

/// A movement about to be appended; the store assigns `id` and `moved_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub stock_item_id: StockItemId,
    pub from_user_id: Option<UserId>,
    pub to_user_id: Option<UserId>,
    pub quantity: i64,
    pub moved_by: UserId,
    pub notes: Option<String>,
}

impl NewMovement {
    /// Finalize the record with store-assigned id and timestamp.
    pub fn into_movement(self, id: MovementId, moved_at: DateTime<Utc>) -> Movement {
        Movement {
            id,
            stock_item_id: self.stock_item_id,
            from_user_id: self.from_user_id,
            to_user_id: self.to_user_id,
            quantity: self.quantity,
            moved_by: self.moved_by,
            notes: self.notes,
            moved_at,
        }
    }
}
