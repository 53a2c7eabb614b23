use serde::{Deserialize, Serialize};

use promostock_core::{StockItemId, UserId};

use crate::StockError;

/// A requested movement of stock between two endpoints.
///
/// `None` on either endpoint is the central pool: issuing is pool → user,
/// returning is user → pool, re-allocating is user → user. `moved_by` is the
/// acting user (from verified claims), which may differ from either endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub item_id: StockItemId,
    /// Source endpoint; `None` is the central pool.
    pub from_user: Option<UserId>,
    /// Destination endpoint; `None` is the central pool.
    pub to_user: Option<UserId>,
    pub quantity: i64,
    pub moved_by: UserId,
    pub notes: Option<String>,
}

impl TransferRequest {
    /// Preconditions checked before any storage access.
    ///
    /// - `quantity` must be positive ([`StockError::InvalidQuantity`]);
    /// - the endpoints must be distinct and at least one must be a user
    ///   ([`StockError::InvalidTransfer`]): pool → pool moves nothing, and so
    ///   does user → same user.
    pub fn validate(&self) -> Result<(), StockError> {
        if self.quantity <= 0 {
            return Err(StockError::InvalidQuantity(self.quantity));
        }
        match (self.from_user, self.to_user) {
            (None, None) => Err(StockError::InvalidTransfer),
            (Some(from), Some(to)) if from == to => Err(StockError::InvalidTransfer),
            _ => Ok(()),
        }
    }
}
