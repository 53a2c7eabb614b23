use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use promostock_core::{AllocationId, StockItemId, UserId};

use crate::StockError;

/// One user's holding of one stock item.
///
/// At most one row exists per `(user_id, stock_item_id)`. A holding that
/// reaches zero stays at zero rather than being deleted; `allocated_by` and
/// `allocated_at` always describe the most recent adjustment, and the full
/// history lives in the movement ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub user_id: UserId,
    pub stock_item_id: StockItemId,
    /// Held quantity; never negative.
    pub quantity: i64,
    /// Acting user of the most recent adjustment.
    pub allocated_by: UserId,
    /// Time of the most recent adjustment.
    pub allocated_at: DateTime<Utc>,
}

impl Allocation {
    /// First credit to a `(user, item)` pair. Identifier comes from the caller
    /// so the transition stays deterministic.
    pub fn open(
        id: AllocationId,
        user_id: UserId,
        stock_item_id: StockItemId,
        quantity: i64,
        allocated_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Allocation, StockError> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }

        Ok(Allocation {
            id,
            user_id,
            stock_item_id,
            quantity,
            allocated_by,
            allocated_at: at,
        })
    }

    /// Apply a signed change to this holding, returning the updated row.
    ///
    /// A negative delta that exceeds the held quantity fails with
    /// [`StockError::InsufficientAllocation`]; the check is exact, nothing
    /// clamps. The caller persists the returned row.
    pub fn adjust(
        &self,
        delta: i64,
        acting_user: UserId,
        at: DateTime<Utc>,
    ) -> Result<Allocation, StockError> {
        let quantity = self.quantity + delta;
        if quantity < 0 {
            return Err(StockError::InsufficientAllocation {
                requested: -delta,
                available: self.quantity,
            });
        }

        Ok(Allocation {
            quantity,
            allocated_by: acting_user,
            allocated_at: at,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(quantity: i64) -> Allocation {
        Allocation {
            id: AllocationId::new(),
            user_id: UserId::new(),
            stock_item_id: StockItemId::new(),
            quantity,
            allocated_by: UserId::new(),
            allocated_at: Utc::now(),
        }
    }

    #[test]
    fn open_requires_a_positive_quantity() {
        let err = Allocation::open(
            AllocationId::new(),
            UserId::new(),
            StockItemId::new(),
            0,
            UserId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, StockError::InvalidQuantity(0));
    }

    #[test]
    fn adjust_records_the_acting_user_and_time() {
        let before = holding(8);
        let keeper = UserId::new();
        let at = Utc::now();

        let after = before.adjust(-3, keeper, at).unwrap();
        assert_eq!(after.quantity, 5);
        assert_eq!(after.allocated_by, keeper);
        assert_eq!(after.allocated_at, at);
        assert_eq!(after.id, before.id);
        assert_eq!(after.user_id, before.user_id);
    }

    #[test]
    fn debit_beyond_holding_is_exact_not_clamped() {
        let before = holding(2);
        let err = before.adjust(-5, UserId::new(), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientAllocation {
                requested: 5,
                available: 2,
            }
        );
    }

    #[test]
    fn holding_may_reach_zero_and_be_credited_again() {
        let keeper = UserId::new();
        let drained = holding(4).adjust(-4, keeper, Utc::now()).unwrap();
        assert_eq!(drained.quantity, 0);

        let refilled = drained.adjust(7, keeper, Utc::now()).unwrap();
        assert_eq!(refilled.quantity, 7);
        assert_eq!(refilled.id, drained.id);
    }
}
