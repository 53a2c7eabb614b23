use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use promostock_infra::{LedgerError, StoreError};
use promostock_inventory::StockError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Stock(stock) => stock_error_to_response(stock),
        LedgerError::Forbidden(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
        LedgerError::TransientConflict { attempts } => json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!("operation abandoned after {attempts} conflicting attempts"),
        ),
        LedgerError::Storage(StoreError::Conflict(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        LedgerError::Storage(StoreError::Unavailable(msg)) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", msg)
        }
        LedgerError::Storage(StoreError::Corrupt(msg)) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_corrupt", msg)
        }
    }
}

fn stock_error_to_response(err: StockError) -> axum::response::Response {
    match err {
        StockError::InvalidQuantity(_)
        | StockError::InvalidTransfer
        | StockError::EmptyItemName => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
        StockError::ItemNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        StockError::DuplicateItem => {
            json_error(StatusCode::CONFLICT, "duplicate_item", err.to_string())
        }
        StockError::InsufficientStock { .. } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_stock",
            err.to_string(),
        ),
        StockError::InsufficientAllocation { .. } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_allocation",
            err.to_string(),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
