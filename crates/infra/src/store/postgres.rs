//! Postgres-backed ledger store.
//!
//! Each unit of work maps to one database transaction. The item row is taken
//! `FOR UPDATE` at the start of every transition, so concurrent transfers of
//! the same item queue up instead of interleaving; serialization failures and
//! deadlocks surface as [`StoreError::Conflict`] and are retried by the
//! caller.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use promostock_core::{AllocationId, MovementId, StockItemId, UserId};
use promostock_inventory::{Allocation, Movement, NewMovement, StockItem};

use super::{LedgerStore, StoreError, UnitOfWork};

const SCHEMA_SQL: &str = include_str!("../../migrations/0001_init.sql");

/// Ledger store on a shared connection pool.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Apply the ledger schema. Idempotent, runs at startup.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&*self.pool)
            .await
            .map_err(|err| map_sqlx_error("ensure_schema", err))?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|err| map_sqlx_error("begin", err))?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    #[instrument(skip(self), fields(item_id = %item_id), err)]
    async fn stock_item(&self, item_id: StockItemId) -> Result<Option<StockItem>, StoreError> {
        let row: Option<StockItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, category_id, description, quantity,
                   created_by, created_at, updated_at
            FROM stock_items
            WHERE id = $1
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|err| map_sqlx_error("stock_item", err))?;

        Ok(row.map(StockItem::from))
    }

    #[instrument(skip(self), err)]
    async fn stock_items(&self) -> Result<Vec<StockItem>, StoreError> {
        let rows: Vec<StockItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, category_id, description, quantity,
                   created_by, created_at, updated_at
            FROM stock_items
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|err| map_sqlx_error("stock_items", err))?;

        Ok(rows.into_iter().map(StockItem::from).collect())
    }

    #[instrument(skip(self), fields(user_id = ?user_id), err)]
    async fn allocations(&self, user_id: Option<UserId>) -> Result<Vec<Allocation>, StoreError> {
        let rows: Vec<AllocationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, stock_item_id, quantity, allocated_by, allocated_at
            FROM allocations
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY allocated_at, id
            "#,
        )
        .bind(user_id.map(|id| *id.as_uuid()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|err| map_sqlx_error("allocations", err))?;

        Ok(rows.into_iter().map(Allocation::from).collect())
    }

    #[instrument(skip(self), fields(item_id = ?item_id), err)]
    async fn movements(&self, item_id: Option<StockItemId>) -> Result<Vec<Movement>, StoreError> {
        let rows: Vec<MovementRow> = sqlx::query_as(
            r#"
            SELECT id, stock_item_id, from_user_id, to_user_id,
                   quantity, moved_by, notes, moved_at
            FROM movements
            WHERE ($1::uuid IS NULL OR stock_item_id = $1)
            ORDER BY moved_at, id
            "#,
        )
        .bind(item_id.map(|id| *id.as_uuid()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|err| map_sqlx_error("movements", err))?;

        Ok(rows.into_iter().map(Movement::from).collect())
    }
}

struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn stock_item(&mut self, item_id: StockItemId) -> Result<Option<StockItem>, StoreError> {
        let row: Option<StockItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, category_id, description, quantity,
                   created_by, created_at, updated_at
            FROM stock_items
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|err| map_sqlx_error("stock_item_for_update", err))?;

        Ok(row.map(StockItem::from))
    }

    async fn insert_stock_item(&mut self, item: &StockItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO stock_items
                (id, name, category_id, description, quantity,
                 created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(item.category_id.as_uuid())
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.created_by.as_uuid())
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|err| map_sqlx_error("insert_stock_item", err))?;

        Ok(())
    }

    async fn update_stock_item(&mut self, item: &StockItem) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE stock_items
            SET name = $2, category_id = $3, description = $4,
                quantity = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(item.category_id.as_uuid())
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|err| map_sqlx_error("update_stock_item", err))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Corrupt(format!(
                "stock item {} vanished mid-transaction",
                item.id
            )));
        }
        Ok(())
    }

    async fn allocation(
        &mut self,
        user_id: UserId,
        item_id: StockItemId,
    ) -> Result<Option<Allocation>, StoreError> {
        let row: Option<AllocationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, stock_item_id, quantity, allocated_by, allocated_at
            FROM allocations
            WHERE user_id = $1 AND stock_item_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(item_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|err| map_sqlx_error("allocation", err))?;

        Ok(row.map(Allocation::from))
    }

    async fn upsert_allocation(&mut self, allocation: &Allocation) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO allocations
                (id, user_id, stock_item_id, quantity, allocated_by, allocated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, stock_item_id)
            DO UPDATE SET quantity = EXCLUDED.quantity,
                          allocated_by = EXCLUDED.allocated_by,
                          allocated_at = EXCLUDED.allocated_at
            "#,
        )
        .bind(allocation.id.as_uuid())
        .bind(allocation.user_id.as_uuid())
        .bind(allocation.stock_item_id.as_uuid())
        .bind(allocation.quantity)
        .bind(allocation.allocated_by.as_uuid())
        .bind(allocation.allocated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|err| map_sqlx_error("upsert_allocation", err))?;

        Ok(())
    }

    async fn append_movement(&mut self, movement: NewMovement) -> Result<Movement, StoreError> {
        let movement = movement.into_movement(MovementId::new(), Utc::now());
        sqlx::query(
            r#"
            INSERT INTO movements
                (id, stock_item_id, from_user_id, to_user_id,
                 quantity, moved_by, notes, moved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(movement.stock_item_id.as_uuid())
        .bind(movement.from_user_id.map(|id| *id.as_uuid()))
        .bind(movement.to_user_id.map(|id| *id.as_uuid()))
        .bind(movement.quantity)
        .bind(movement.moved_by.as_uuid())
        .bind(&movement.notes)
        .bind(movement.moved_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|err| map_sqlx_error("append_movement", err))?;

        Ok(movement)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|err| map_sqlx_error("commit", err))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|err| map_sqlx_error("rollback", err))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

struct StockItemRow {
    id: Uuid,
    name: String,
    category_id: Uuid,
    description: Option<String>,
    quantity: i64,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for StockItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category_id: row.try_get("category_id")?,
            description: row.try_get("description")?,
            quantity: row.try_get("quantity")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<StockItemRow> for StockItem {
    fn from(row: StockItemRow) -> Self {
        StockItem {
            id: StockItemId::from(row.id),
            name: row.name,
            category_id: row.category_id.into(),
            description: row.description,
            quantity: row.quantity,
            created_by: UserId::from(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

struct AllocationRow {
    id: Uuid,
    user_id: Uuid,
    stock_item_id: Uuid,
    quantity: i64,
    allocated_by: Uuid,
    allocated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for AllocationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            stock_item_id: row.try_get("stock_item_id")?,
            quantity: row.try_get("quantity")?,
            allocated_by: row.try_get("allocated_by")?,
            allocated_at: row.try_get("allocated_at")?,
        })
    }
}

impl From<AllocationRow> for Allocation {
    fn from(row: AllocationRow) -> Self {
        Allocation {
            id: AllocationId::from(row.id),
            user_id: UserId::from(row.user_id),
            stock_item_id: StockItemId::from(row.stock_item_id),
            quantity: row.quantity,
            allocated_by: UserId::from(row.allocated_by),
            allocated_at: row.allocated_at,
        }
    }
}

struct MovementRow {
    id: Uuid,
    stock_item_id: Uuid,
    from_user_id: Option<Uuid>,
    to_user_id: Option<Uuid>,
    quantity: i64,
    moved_by: Uuid,
    notes: Option<String>,
    moved_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for MovementRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            stock_item_id: row.try_get("stock_item_id")?,
            from_user_id: row.try_get("from_user_id")?,
            to_user_id: row.try_get("to_user_id")?,
            quantity: row.try_get("quantity")?,
            moved_by: row.try_get("moved_by")?,
            notes: row.try_get("notes")?,
            moved_at: row.try_get("moved_at")?,
        })
    }
}

impl From<MovementRow> for Movement {
    fn from(row: MovementRow) -> Self {
        Movement {
            id: MovementId::from(row.id),
            stock_item_id: StockItemId::from(row.stock_item_id),
            from_user_id: row.from_user_id.map(UserId::from),
            to_user_id: row.to_user_id.map(UserId::from),
            quantity: row.quantity,
            moved_by: UserId::from(row.moved_by),
            notes: row.notes,
            moved_at: row.moved_at,
        }
    }
}

/// Map driver errors onto the store taxonomy.
///
/// `40001` (serialization failure), `40P01` (deadlock) and `23505` (unique
/// violation) are all conflicts from the caller's point of view: rerunning the
/// unit of work against the now-committed state yields a definitive outcome.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let detail = format!("{operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("40001") | Some("40P01") | Some("23505") => StoreError::Conflict(detail),
                _ => StoreError::Unavailable(detail),
            }
        }
        sqlx::Error::RowNotFound => {
            StoreError::Corrupt(format!("{operation}: expected row missing"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(format!("{operation}: {err}"))
        }
        other => StoreError::Unavailable(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_expected_rows_classify_as_corrupt() {
        let err = map_sqlx_error("probe", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Corrupt(_)));
        assert!(err.to_string().contains("probe"));
    }

    #[test]
    fn connection_failures_classify_as_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = map_sqlx_error("probe", sqlx::Error::Io(io));
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn schema_file_creates_all_three_tables() {
        for table in ["stock_items", "allocations", "movements"] {
            assert!(
                SCHEMA_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "schema is missing {table}"
            );
        }
        assert!(SCHEMA_SQL.contains("UNIQUE (user_id, stock_item_id)"));
    }
}
