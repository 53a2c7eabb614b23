use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use promostock_core::{CategoryId, StockItemId, UserId};

use crate::StockError;

/// A stock item and its central-pool quantity.
///
/// `quantity` is the undistributed remainder held centrally; per-user holdings
/// live in [`Allocation`](crate::Allocation) rows. The pool changes only
/// through [`StockItem::adjust_quantity`], whether the caller is the transfer
/// engine or the direct restock/write-off path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: StockItemId,
    pub name: String,
    pub category_id: CategoryId,
    pub description: Option<String>,
    /// Central-pool quantity; never negative.
    pub quantity: i64,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// Apply a signed change to the central pool, returning the updated row.
    ///
    /// A negative delta that exceeds what the pool holds fails with
    /// [`StockError::InsufficientStock`]; the check is exact, nothing clamps.
    /// The caller persists the returned row.
    pub fn adjust_quantity(&self, delta: i64, at: DateTime<Utc>) -> Result<StockItem, StockError> {
        let quantity = self.quantity + delta;
        if quantity < 0 {
            return Err(StockError::InsufficientStock {
                requested: -delta,
                available: self.quantity,
            });
        }

        Ok(StockItem {
            quantity,
            updated_at: at,
            ..self.clone()
        })
    }
}

/// Input for creating a stock item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStockItem {
    pub name: String,
    pub category_id: CategoryId,
    pub description: Option<String>,
    /// Opening central-pool quantity; zero is a valid opening state.
    pub quantity: i64,
}

impl NewStockItem {
    pub fn validate(&self) -> Result<(), StockError> {
        if self.name.trim().is_empty() {
            return Err(StockError::EmptyItemName);
        }
        if self.quantity < 0 {
            return Err(StockError::InvalidQuantity(self.quantity));
        }
        Ok(())
    }

    /// Materialize the row. Identifier and audit fields come from the caller
    /// so the transition stays deterministic.
    pub fn into_item(
        self,
        id: StockItemId,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<StockItem, StockError> {
        self.validate()?;

        Ok(StockItem {
            id,
            name: self.name.trim().to_string(),
            category_id: self.category_id,
            description: self.description,
            quantity: self.quantity,
            created_by,
            created_at: at,
            updated_at: at,
        })
    }
}
