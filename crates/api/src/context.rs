use promostock_auth::{Actor, Role};
use promostock_core::UserId;

/// Authenticated actor context for a request.
///
/// Inserted by the auth middleware from verified token claims; present on
/// every protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub fn user_id(&self) -> UserId {
        self.actor.id
    }

    pub fn role(&self) -> Role {
        self.actor.role
    }
}
