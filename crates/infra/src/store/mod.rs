//! Ledger persistence boundary.
//!
//! One [`LedgerStore`] trait with two implementations, selected once at
//! startup: [`in_memory::InMemoryLedgerStore`] for tests/dev and
//! [`postgres::PostgresLedgerStore`] for production. All mutation happens
//! inside a [`UnitOfWork`]; the read paths are snapshot reads on the store
//! itself.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use promostock_core::{StockItemId, UserId};
use promostock_inventory::{Allocation, Movement, NewMovement, StockItem};

/// Ledger storage operation error.
///
/// These are **infrastructure errors** (locks, connectivity, row decoding) as
/// opposed to domain errors (validation, availability), which never originate
/// in a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transient lock/serialization conflict; the whole unit of work may be
    /// retried.
    #[error("storage conflict: {0}")]
    Conflict(String),

    /// Backend failed or is unreachable; not retryable here.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored row failed to decode.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// One atomic ledger transition.
///
/// Writes staged through a unit of work become visible together at `commit`,
/// or not at all: dropping an uncommitted unit of work rolls back. Loading an
/// item row through [`UnitOfWork::stock_item`] holds that row for the
/// remainder of the transaction, which serializes concurrent transfers of the
/// same item.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Load the item row and hold it until commit/rollback.
    async fn stock_item(&mut self, item_id: StockItemId) -> Result<Option<StockItem>, StoreError>;

    async fn insert_stock_item(&mut self, item: &StockItem) -> Result<(), StoreError>;

    async fn update_stock_item(&mut self, item: &StockItem) -> Result<(), StoreError>;

    async fn allocation(
        &mut self,
        user_id: UserId,
        item_id: StockItemId,
    ) -> Result<Option<Allocation>, StoreError>;

    async fn upsert_allocation(&mut self, allocation: &Allocation) -> Result<(), StoreError>;

    /// Append to the movement ledger; the store assigns `id` and `moved_at`.
    async fn append_movement(&mut self, movement: NewMovement) -> Result<Movement, StoreError>;

    /// Make all staged writes visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard staged writes. Dropping without commit has the same effect.
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Storage backend for the allocation ledger.
///
/// Mutations go through [`LedgerStore::begin`]; the remaining methods are
/// read-only snapshot queries with deterministic ordering (time, then id).
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a unit of work for one atomic transition.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    async fn stock_item(&self, item_id: StockItemId) -> Result<Option<StockItem>, StoreError>;

    async fn stock_items(&self) -> Result<Vec<StockItem>, StoreError>;

    /// Allocations, optionally restricted to one holder.
    async fn allocations(&self, user_id: Option<UserId>) -> Result<Vec<Allocation>, StoreError>;

    /// Movement history, optionally restricted to one item.
    async fn movements(&self, item_id: Option<StockItemId>) -> Result<Vec<Movement>, StoreError>;
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        (**self).begin().await
    }

    async fn stock_item(&self, item_id: StockItemId) -> Result<Option<StockItem>, StoreError> {
        (**self).stock_item(item_id).await
    }

    async fn stock_items(&self) -> Result<Vec<StockItem>, StoreError> {
        (**self).stock_items().await
    }

    async fn allocations(&self, user_id: Option<UserId>) -> Result<Vec<Allocation>, StoreError> {
        (**self).allocations(user_id).await
    }

    async fn movements(&self, item_id: Option<StockItemId>) -> Result<Vec<Movement>, StoreError> {
        (**self).movements(item_id).await
    }
}
