//! Infrastructure layer: storage backends, the transfer engine, and the
//! capability-gated ledger service.

pub mod engine;
pub mod service;
pub mod store;


pub use engine::{LedgerError, TransferEngine};
pub use service::LedgerService;
pub use store::in_memory::InMemoryLedgerStore;
pub use store::postgres::PostgresLedgerStore;
pub use store::{LedgerStore, StoreError, UnitOfWork};
