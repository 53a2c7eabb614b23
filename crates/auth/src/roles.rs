use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Organizational role of an acting user.
///
/// The role set is closed: policy is a fixed table over these variants, not
/// configuration. A user carries exactly one role (from token claims).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    StockKeeper,
    ProductManager,
    SalesManager,
    FieldRep,
}

impl Role {
    /// Every role, in privilege order (for display and matrix tests).
    pub const ALL: [Role; 6] = [
        Role::Owner,
        Role::Admin,
        Role::StockKeeper,
        Role::ProductManager,
        Role::SalesManager,
        Role::FieldRep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::StockKeeper => "stock_keeper",
            Role::ProductManager => "product_manager",
            Role::SalesManager => "sales_manager",
            Role::FieldRep => "field_rep",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role name that is not part of the closed role set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "stock_keeper" => Ok(Role::StockKeeper),
            "product_manager" => Ok(Role::ProductManager),
            "sales_manager" => Ok(Role::SalesManager),
            "field_rep" => Ok(Role::FieldRep),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
