//! Capability-gated entry points for every ledger operation.
//!
//! [`LedgerService`] is the only surface callers (the HTTP layer, tests,
//! future CLIs) go through. Each mutating method derives the capability the
//! operation requires and checks it against the actor's role before touching
//! storage; a forbidden actor leaves the stores byte-for-byte untouched.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use promostock_auth::{Actor, Capability, Role, authorize, has_capability};
use promostock_core::{StockItemId, UserId};
use promostock_inventory::{
    Allocation, Movement, NewStockItem, StockError, StockItem, TransferRequest,
};

use crate::engine::{LedgerError, MAX_ATTEMPTS, TransferEngine};
use crate::store::{LedgerStore, StoreError};

/// The gated ledger service.
///
/// Reads are open to any authenticated actor; mutations require the matching
/// capability:
///
/// * transfers with both endpoints set (user-to-user) need `allocate`
/// * transfers touching the pool need `move_stock`
/// * item lifecycle (create, restock, write-off) needs `manage_items`
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    engine: TransferEngine,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        let engine = TransferEngine::new(store.clone());
        Self { store, engine }
    }

    /// Capability implied by the shape of a transfer.
    fn transfer_capability(request: &TransferRequest) -> Capability {
        match (request.from_user, request.to_user) {
            (Some(_), Some(_)) => Capability::Allocate,
            _ => Capability::MoveStock,
        }
    }

    /// Execute a transfer as `actor`.
    #[instrument(
        skip(self, request),
        fields(actor = %actor.id, role = %actor.role, item_id = %request.item_id),
        err
    )]
    pub async fn transfer(
        &self,
        actor: Actor,
        request: TransferRequest,
    ) -> Result<Movement, LedgerError> {
        authorize(actor.role, Self::transfer_capability(&request))?;
        self.engine.transfer(&request).await
    }

    /// Create a stock item.
    ///
    /// `id` is normally left to the server; callers that supply their own get
    /// idempotent-create semantics, with [`StockError::DuplicateItem`] when
    /// the id is already taken.
    #[instrument(skip(self, new_item), fields(actor = %actor.id, role = %actor.role), err)]
    pub async fn create_item(
        &self,
        actor: Actor,
        id: Option<StockItemId>,
        new_item: NewStockItem,
    ) -> Result<StockItem, LedgerError> {
        authorize(actor.role, Capability::ManageItems)?;
        let id = id.unwrap_or_else(StockItemId::new);
        let item = new_item.into_item(id, actor.id, Utc::now())?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_create(&item).await {
                Err(LedgerError::Storage(StoreError::Conflict(_))) if attempt < MAX_ATTEMPTS => {}
                Err(LedgerError::Storage(StoreError::Conflict(_))) => {
                    return Err(LedgerError::TransientConflict { attempts: attempt });
                }
                outcome => return outcome,
            }
        }
    }

    async fn try_create(&self, item: &StockItem) -> Result<StockItem, LedgerError> {
        let mut uow = self.store.begin().await?;
        if uow.stock_item(item.id).await?.is_some() {
            uow.rollback().await?;
            return Err(StockError::DuplicateItem.into());
        }
        uow.insert_stock_item(item).await?;
        uow.commit().await?;
        Ok(item.clone())
    }

    /// Add `quantity` to an item's central pool.
    ///
    /// Restock changes total stock on purpose, so no movement record is
    /// appended; movements only describe conserved transfers.
    #[instrument(skip(self), fields(actor = %actor.id, role = %actor.role, item_id = %item_id), err)]
    pub async fn restock(
        &self,
        actor: Actor,
        item_id: StockItemId,
        quantity: i64,
    ) -> Result<StockItem, LedgerError> {
        authorize(actor.role, Capability::ManageItems)?;
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity).into());
        }
        self.adjust_pool(item_id, quantity).await
    }

    /// Remove `quantity` from an item's central pool (damaged, expired).
    ///
    /// Fails with [`StockError::InsufficientStock`] when the pool holds less;
    /// allocated stock must be returned before it can be written off.
    #[instrument(skip(self), fields(actor = %actor.id, role = %actor.role, item_id = %item_id), err)]
    pub async fn write_off(
        &self,
        actor: Actor,
        item_id: StockItemId,
        quantity: i64,
    ) -> Result<StockItem, LedgerError> {
        authorize(actor.role, Capability::ManageItems)?;
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity).into());
        }
        self.adjust_pool(item_id, -quantity).await
    }

    async fn adjust_pool(
        &self,
        item_id: StockItemId,
        delta: i64,
    ) -> Result<StockItem, LedgerError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_adjust_pool(item_id, delta).await {
                Err(LedgerError::Storage(StoreError::Conflict(_))) if attempt < MAX_ATTEMPTS => {}
                Err(LedgerError::Storage(StoreError::Conflict(_))) => {
                    return Err(LedgerError::TransientConflict { attempts: attempt });
                }
                outcome => return outcome,
            }
        }
    }

    async fn try_adjust_pool(
        &self,
        item_id: StockItemId,
        delta: i64,
    ) -> Result<StockItem, LedgerError> {
        let mut uow = self.store.begin().await?;
        let item = match uow.stock_item(item_id).await? {
            Some(item) => item,
            None => {
                uow.rollback().await?;
                return Err(StockError::ItemNotFound.into());
            }
        };

        match item.adjust_quantity(delta, Utc::now()) {
            Ok(updated) => {
                uow.update_stock_item(&updated).await?;
                uow.commit().await?;
                Ok(updated)
            }
            Err(err) => {
                uow.rollback().await?;
                Err(err.into())
            }
        }
    }

    pub async fn stock_item(&self, item_id: StockItemId) -> Result<Option<StockItem>, LedgerError> {
        Ok(self.store.stock_item(item_id).await?)
    }

    pub async fn stock_items(&self) -> Result<Vec<StockItem>, LedgerError> {
        Ok(self.store.stock_items().await?)
    }

    /// Current allocations, optionally restricted to one holder.
    pub async fn allocations(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<Allocation>, LedgerError> {
        Ok(self.store.allocations(user_id).await?)
    }

    /// Movement history, optionally restricted to one item.
    pub async fn movements(
        &self,
        item_id: Option<StockItemId>,
    ) -> Result<Vec<Movement>, LedgerError> {
        Ok(self.store.movements(item_id).await?)
    }

    /// Whether `role` holds `capability` under the fixed role table.
    pub fn has_capability(&self, role: Role, capability: Capability) -> bool {
        has_capability(role, capability)
    }
}
