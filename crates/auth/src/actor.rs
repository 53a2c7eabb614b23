use serde::{Deserialize, Serialize};

use promostock_core::UserId;

use crate::Role;

/// An authenticated caller: identity plus the role every capability check
/// runs against.
///
/// Constructed from validated token claims at the edge; everything below the
/// edge takes an `Actor` and never re-reads the token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}
