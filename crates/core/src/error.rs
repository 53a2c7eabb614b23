//! Shared error for identifier parsing.
//!
//! Domain failures live next to the code that produces them (`StockError` in
//! the inventory crate, `AuthzError` in the auth crate); this crate only owns
//! the one failure its own types can produce.

use thiserror::Error;

/// A strongly-typed identifier failed to parse from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {kind} identifier: {detail}")]
pub struct IdParseError {
    kind: &'static str,
    detail: String,
}

impl IdParseError {
    pub(crate) fn new(kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Name of the identifier type that failed to parse (e.g. `"UserId"`).
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}
