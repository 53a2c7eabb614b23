use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A gated operation class.
///
/// Capabilities name *what kind of change* an operation makes, not the
/// endpoint it arrives through; the gate derives the required capability from
/// the shape of the request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Administer user accounts.
    ManageUsers,
    /// Create stock items and adjust the central pool directly (restock,
    /// write-off).
    ManageItems,
    /// Move quantity between the central pool and a user (either direction).
    MoveStock,
    /// Move quantity between two users.
    Allocate,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::ManageUsers,
        Capability::ManageItems,
        Capability::MoveStock,
        Capability::Allocate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageUsers => "manage_users",
            Capability::ManageItems => "manage_items",
            Capability::MoveStock => "move_stock",
            Capability::Allocate => "allocate",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability name that is not part of the closed capability set.
///
/// Unlike an unknown role (which fails closed to "no grants"), an unknown
/// capability is a caller programming error and is rejected loudly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manage_users" => Ok(Capability::ManageUsers),
            "manage_items" => Ok(Capability::ManageItems),
            "move_stock" => Ok(Capability::MoveStock),
            "allocate" => Ok(Capability::Allocate),
            other => Err(UnknownCapability(other.to_string())),
        }
    }
}
