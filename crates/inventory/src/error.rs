use thiserror::Error;

/// Deterministic domain failures of the allocation ledger.
///
/// Every variant is a business outcome, not an infrastructure fault: given the
/// same ledger state and the same input, the same variant comes back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// Quantity was zero or negative where a positive amount is required.
    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(i64),

    /// The transfer endpoints do not describe a movement (both central, or
    /// the same user on both sides).
    #[error("transfer must move stock between two distinct endpoints, at least one of them a user")]
    InvalidTransfer,

    /// Item name was empty after trimming.
    #[error("item name cannot be empty")]
    EmptyItemName,

    /// The referenced stock item does not exist.
    #[error("stock item not found")]
    ItemNotFound,

    /// A stock item with the same identifier already exists.
    #[error("stock item already exists")]
    DuplicateItem,

    /// The central pool holds less than the requested quantity.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// The source user's allocation holds less than the requested quantity.
    #[error("insufficient allocation: requested {requested}, available {available}")]
    InsufficientAllocation { requested: i64, available: i64 },
}
