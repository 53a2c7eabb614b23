//! In-memory ledger store for tests and local development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use promostock_core::{MovementId, StockItemId, UserId};
use promostock_inventory::{Allocation, Movement, NewMovement, StockItem};

use super::{LedgerStore, StoreError, UnitOfWork};

#[derive(Debug, Default)]
struct MemState {
    items: HashMap<StockItemId, StockItem>,
    allocations: HashMap<(UserId, StockItemId), Allocation>,
    movements: Vec<Movement>,
}

/// Whole-ledger mutex standing in for row locks: a unit of work holds the
/// guard until commit/rollback, so transitions are fully serialized and the
/// read paths only ever observe committed states.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<MemState>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            staged_items: HashMap::new(),
            staged_allocations: HashMap::new(),
            staged_movements: Vec::new(),
        }))
    }

    async fn stock_item(&self, item_id: StockItemId) -> Result<Option<StockItem>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.items.get(&item_id).cloned())
    }

    async fn stock_items(&self) -> Result<Vec<StockItem>, StoreError> {
        let state = self.state.lock().await;
        let mut items: Vec<StockItem> = state.items.values().cloned().collect();
        items.sort_by_key(|item| (item.created_at, item.id));
        Ok(items)
    }

    async fn allocations(&self, user_id: Option<UserId>) -> Result<Vec<Allocation>, StoreError> {
        let state = self.state.lock().await;
        let mut allocations: Vec<Allocation> = state
            .allocations
            .values()
            .filter(|allocation| user_id.is_none_or(|user| allocation.user_id == user))
            .cloned()
            .collect();
        allocations.sort_by_key(|allocation| (allocation.allocated_at, allocation.id));
        Ok(allocations)
    }

    async fn movements(&self, item_id: Option<StockItemId>) -> Result<Vec<Movement>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .movements
            .iter()
            .filter(|movement| item_id.is_none_or(|item| movement.stock_item_id == item))
            .cloned()
            .collect())
    }
}

/// Staged writes overlaying the committed state behind the held guard.
struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<MemState>,
    staged_items: HashMap<StockItemId, StockItem>,
    staged_allocations: HashMap<(UserId, StockItemId), Allocation>,
    staged_movements: Vec<Movement>,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn stock_item(&mut self, item_id: StockItemId) -> Result<Option<StockItem>, StoreError> {
        Ok(self
            .staged_items
            .get(&item_id)
            .or_else(|| self.guard.items.get(&item_id))
            .cloned())
    }

    async fn insert_stock_item(&mut self, item: &StockItem) -> Result<(), StoreError> {
        // Mirrors a unique-key violation on the primary key.
        if self.staged_items.contains_key(&item.id) || self.guard.items.contains_key(&item.id) {
            return Err(StoreError::Conflict(format!(
                "stock item {} already exists",
                item.id
            )));
        }
        self.staged_items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_stock_item(&mut self, item: &StockItem) -> Result<(), StoreError> {
        self.staged_items.insert(item.id, item.clone());
        Ok(())
    }

    async fn allocation(
        &mut self,
        user_id: UserId,
        item_id: StockItemId,
    ) -> Result<Option<Allocation>, StoreError> {
        let key = (user_id, item_id);
        Ok(self
            .staged_allocations
            .get(&key)
            .or_else(|| self.guard.allocations.get(&key))
            .cloned())
    }

    async fn upsert_allocation(&mut self, allocation: &Allocation) -> Result<(), StoreError> {
        self.staged_allocations
            .insert((allocation.user_id, allocation.stock_item_id), allocation.clone());
        Ok(())
    }

    async fn append_movement(&mut self, movement: NewMovement) -> Result<Movement, StoreError> {
        let movement = movement.into_movement(MovementId::new(), Utc::now());
        self.staged_movements.push(movement.clone());
        Ok(movement)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryUnitOfWork {
            mut guard,
            staged_items,
            staged_allocations,
            staged_movements,
        } = *self;
        guard.items.extend(staged_items);
        guard.allocations.extend(staged_allocations);
        guard.movements.extend(staged_movements);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        // Staged writes and the guard are simply dropped.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use promostock_core::{AllocationId, CategoryId};
    use promostock_inventory::NewStockItem;

    use super::*;

    fn sample_item() -> StockItem {
        NewStockItem {
            name: "Sample pens".to_string(),
            category_id: CategoryId::new(),
            description: None,
            quantity: 100,
        }
        .into_item(StockItemId::new(), UserId::new(), Utc::now())
        .unwrap()
    }

    #[tokio::test]
    async fn committed_writes_are_visible_to_reads() {
        let store = InMemoryLedgerStore::new();
        let item = sample_item();

        let mut uow = store.begin().await.unwrap();
        uow.insert_stock_item(&item).await.unwrap();
        uow.commit().await.unwrap();

        let loaded = store.stock_item(item.id).await.unwrap().unwrap();
        assert_eq!(loaded.quantity, 100);
        assert_eq!(store.stock_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropping_a_unit_of_work_discards_staged_writes() {
        let store = InMemoryLedgerStore::new();
        let item = sample_item();

        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_stock_item(&item).await.unwrap();
            // No commit.
        }

        assert!(store.stock_item(item.id).await.unwrap().is_none());
        assert!(store.stock_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rollback_discards_staged_writes() {
        let store = InMemoryLedgerStore::new();
        let item = sample_item();

        let mut uow = store.begin().await.unwrap();
        uow.insert_stock_item(&item).await.unwrap();
        uow.rollback().await.unwrap();

        assert!(store.stock_item(item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn staged_writes_shadow_committed_state_within_a_unit_of_work() {
        let store = InMemoryLedgerStore::new();
        let item = sample_item();

        let mut uow = store.begin().await.unwrap();
        uow.insert_stock_item(&item).await.unwrap();
        let adjusted = item.adjust_quantity(-40, Utc::now()).unwrap();
        uow.update_stock_item(&adjusted).await.unwrap();

        let seen = uow.stock_item(item.id).await.unwrap().unwrap();
        assert_eq!(seen.quantity, 60);
        uow.commit().await.unwrap();

        let committed = store.stock_item(item.id).await.unwrap().unwrap();
        assert_eq!(committed.quantity, 60);
    }

    #[tokio::test]
    async fn duplicate_insert_reports_a_conflict() {
        let store = InMemoryLedgerStore::new();
        let item = sample_item();

        let mut uow = store.begin().await.unwrap();
        uow.insert_stock_item(&item).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let err = uow.insert_stock_item(&item).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn allocation_filter_restricts_to_one_holder() {
        let store = InMemoryLedgerStore::new();
        let item = sample_item();
        let (alice, bob) = (UserId::new(), UserId::new());
        let admin = UserId::new();

        let mut uow = store.begin().await.unwrap();
        uow.insert_stock_item(&item).await.unwrap();
        for user in [alice, bob] {
            let allocation =
                Allocation::open(AllocationId::new(), user, item.id, 10, admin, Utc::now())
                    .unwrap();
            uow.upsert_allocation(&allocation).await.unwrap();
        }
        uow.commit().await.unwrap();

        assert_eq!(store.allocations(None).await.unwrap().len(), 2);
        let only_alice = store.allocations(Some(alice)).await.unwrap();
        assert_eq!(only_alice.len(), 1);
        assert_eq!(only_alice[0].user_id, alice);
    }

    #[tokio::test]
    async fn movement_appends_preserve_order_and_assign_ids() {
        let store = InMemoryLedgerStore::new();
        let item = sample_item();
        let user = UserId::new();

        let mut uow = store.begin().await.unwrap();
        uow.insert_stock_item(&item).await.unwrap();
        let first = uow
            .append_movement(NewMovement {
                stock_item_id: item.id,
                from_user_id: None,
                to_user_id: Some(user),
                quantity: 5,
                moved_by: user,
                notes: Some("first".to_string()),
            })
            .await
            .unwrap();
        let second = uow
            .append_movement(NewMovement {
                stock_item_id: item.id,
                from_user_id: Some(user),
                to_user_id: None,
                quantity: 2,
                moved_by: user,
                notes: None,
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();

        assert_ne!(first.id, second.id);
        let history = store.movements(Some(item.id)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].notes.as_deref(), Some("first"));
        assert_eq!(history[1].quantity, 2);
        assert!(store
            .movements(Some(StockItemId::new()))
            .await
            .unwrap()
            .is_empty());
    }
}
