//! Transfer execution.
//!
//! One transfer is one unit of work: debit the source, credit the
//! destination, append the movement record, commit. Any failure before commit
//! rolls the whole transition back, so the conservation invariant (pool plus
//! allocations is constant except through restock/write-off) can never be
//! broken by a half-applied transfer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use promostock_auth::AuthzError;
use promostock_core::AllocationId;
use promostock_inventory::{
    Allocation, Movement, NewMovement, StockError, StockItem, TransferRequest,
};

use crate::store::{LedgerStore, StoreError, UnitOfWork};

/// Attempts per transfer before giving up on transient conflicts.
pub(crate) const MAX_ATTEMPTS: u32 = 3;

/// Failure of a ledger operation, as seen by callers of the service layer.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Deterministic domain rejection; retrying the same request cannot
    /// succeed.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// The actor's role lacks the capability the operation requires.
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Every attempt hit a transient storage conflict.
    #[error("operation abandoned after {attempts} conflicting attempts")]
    TransientConflict { attempts: u32 },

    /// Storage failed outright.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Executes transfers against whichever [`LedgerStore`] the process was
/// started with.
#[derive(Clone)]
pub struct TransferEngine {
    store: Arc<dyn LedgerStore>,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Run a transfer to completion.
    ///
    /// Request validation happens before any storage access. The transition
    /// itself runs in a fresh unit of work per attempt and is retried on
    /// [`StoreError::Conflict`] up to [`MAX_ATTEMPTS`] times; domain
    /// rejections are never retried.
    #[instrument(
        skip(self, request),
        fields(item_id = %request.item_id, quantity = request.quantity),
        err
    )]
    pub async fn transfer(&self, request: &TransferRequest) -> Result<Movement, LedgerError> {
        request.validate()?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_transfer(request).await {
                Err(LedgerError::Storage(StoreError::Conflict(reason))) => {
                    if attempt >= MAX_ATTEMPTS {
                        tracing::warn!(attempts = attempt, %reason, "transfer abandoned");
                        return Err(LedgerError::TransientConflict { attempts: attempt });
                    }
                    tracing::debug!(attempt, %reason, "transfer conflicted, retrying");
                }
                outcome => return outcome,
            }
        }
    }

    /// One attempt, one unit of work.
    async fn try_transfer(&self, request: &TransferRequest) -> Result<Movement, LedgerError> {
        let now = Utc::now();
        let mut uow = self.store.begin().await?;

        // Loading the item row locks it, serializing transfers of this item.
        let item = match uow.stock_item(request.item_id).await? {
            Some(item) => item,
            None => {
                uow.rollback().await?;
                return Err(StockError::ItemNotFound.into());
            }
        };

        match Self::apply(uow.as_mut(), item, request, now).await {
            Ok(movement) => {
                uow.commit().await?;
                Ok(movement)
            }
            Err(err) => {
                uow.rollback().await?;
                Err(err)
            }
        }
    }

    /// Debit, credit, append. The debit always runs first so an unfunded
    /// transfer fails before anything is credited.
    async fn apply(
        uow: &mut dyn UnitOfWork,
        mut item: StockItem,
        request: &TransferRequest,
        now: DateTime<Utc>,
    ) -> Result<Movement, LedgerError> {
        let quantity = request.quantity;

        match request.from_user {
            None => {
                item = item.adjust_quantity(-quantity, now)?;
                uow.update_stock_item(&item).await?;
            }
            Some(source) => {
                let debited = match uow.allocation(source, request.item_id).await? {
                    Some(holding) => holding.adjust(-quantity, request.moved_by, now)?,
                    None => {
                        // No allocation row means the user holds nothing.
                        return Err(StockError::InsufficientAllocation {
                            requested: quantity,
                            available: 0,
                        }
                        .into());
                    }
                };
                uow.upsert_allocation(&debited).await?;
            }
        }

        match request.to_user {
            None => {
                item = item.adjust_quantity(quantity, now)?;
                uow.update_stock_item(&item).await?;
            }
            Some(destination) => {
                let credited = match uow.allocation(destination, request.item_id).await? {
                    Some(holding) => holding.adjust(quantity, request.moved_by, now)?,
                    None => Allocation::open(
                        AllocationId::new(),
                        destination,
                        request.item_id,
                        quantity,
                        request.moved_by,
                        now,
                    )?,
                };
                uow.upsert_allocation(&credited).await?;
            }
        }

        let movement = uow
            .append_movement(NewMovement {
                stock_item_id: request.item_id,
                from_user_id: request.from_user,
                to_user_id: request.to_user,
                quantity,
                moved_by: request.moved_by,
                notes: request.notes.clone(),
            })
            .await?;

        Ok(movement)
    }
}
