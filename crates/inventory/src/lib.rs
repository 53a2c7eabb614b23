//! Stock allocation domain.
//!
//! This crate contains the business rules of the allocation ledger,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage): item and holding rows, their quantity transitions, the movement
//! record, and transfer-request validation.

pub mod allocation;
pub mod error;
pub mod item;
pub mod movement;
pub mod transfer;

pub use allocation::Allocation;
pub use error::StockError;
pub use item::{NewStockItem, StockItem};
pub use movement::{Movement, NewMovement};
pub use transfer::TransferRequest;
