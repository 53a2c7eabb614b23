use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use promostock_infra::{InMemoryLedgerStore, LedgerService, PostgresLedgerStore};

/// Everything the route handlers need, behind one `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub ledger: LedgerService,
}

/// Wire the ledger service against the backend named by `PROMOSTOCK_STORE`
/// (`memory` or `postgres`; defaults to `memory`).
///
/// The postgres backend requires `DATABASE_URL` and applies the schema on
/// startup. Misconfiguration fails here rather than at first request.
pub async fn build_services() -> anyhow::Result<AppServices> {
    let backend = std::env::var("PROMOSTOCK_STORE").unwrap_or_else(|_| "memory".to_string());

    let ledger = match backend.as_str() {
        "postgres" => {
            let url = std::env::var("DATABASE_URL")
                .context("PROMOSTOCK_STORE=postgres requires DATABASE_URL")?;
            let pool = PgPoolOptions::new()
                .max_connections(16)
                .connect(&url)
                .await
                .context("failed to connect to postgres")?;
            let store = PostgresLedgerStore::new(pool);
            store.ensure_schema().await?;
            tracing::info!(backend = "postgres", "ledger store ready");
            LedgerService::new(Arc::new(store))
        }
        "memory" => {
            tracing::info!(backend = "memory", "ledger store ready");
            LedgerService::new(Arc::new(InMemoryLedgerStore::new()))
        }
        other => anyhow::bail!(
            "unsupported PROMOSTOCK_STORE value '{other}' (expected 'memory' or 'postgres')"
        ),
    };

    Ok(AppServices { ledger })
}

/// In-memory wiring for tests; every call gets an isolated store.
pub fn in_memory_services() -> AppServices {
    AppServices {
        ledger: LedgerService::new(Arc::new(InMemoryLedgerStore::new())),
    }
}
