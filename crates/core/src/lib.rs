//! `promostock-core` — shared identifier types for the allocation ledger.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::IdParseError;
pub use id::{AllocationId, CategoryId, MovementId, StockItemId, UserId};
