use thiserror::Error;

use crate::{Capability, Role};

/// Fixed role → capability grant table.
///
/// Total over both enums and constant for the life of the process; nothing at
/// runtime can add or revoke a grant. `Owner` and `Admin` hold everything.
pub const fn has_capability(role: Role, capability: Capability) -> bool {
    use Capability::*;
    use Role::*;

    match (role, capability) {
        (Owner | Admin, _) => true,
        (StockKeeper, ManageItems | MoveStock | Allocate) => true,
        (ProductManager, ManageItems | MoveStock) => true,
        (SalesManager, Allocate) => true,
        _ => false,
    }
}

/// Capabilities granted to a role, in declaration order.
pub fn granted_capabilities(role: Role) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|capability| has_capability(role, *capability))
        .collect()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' lacks capability '{capability}'")]
    Forbidden { role: Role, capability: Capability },
}

/// Authorize an actor's role for a capability.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(role: Role, capability: Capability) -> Result<(), AuthzError> {
    if has_capability(role, capability) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden { role, capability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(role: Role, capability: Capability) -> bool {
        use Capability::*;
        use Role::*;

        match role {
            Owner | Admin => true,
            StockKeeper => matches!(capability, ManageItems | MoveStock | Allocate),
            ProductManager => matches!(capability, ManageItems | MoveStock),
            SalesManager => matches!(capability, Allocate),
            FieldRep => false,
        }
    }

    #[test]
    fn grant_table_matches_policy_for_every_pair() {
        for role in Role::ALL {
            for capability in Capability::ALL {
                assert_eq!(
                    has_capability(role, capability),
                    expected(role, capability),
                    "{role} / {capability}"
                );
            }
        }
    }

    #[test]
    fn authorize_names_the_missing_grant() {
        let err = authorize(Role::FieldRep, Capability::MoveStock).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                role: Role::FieldRep,
                capability: Capability::MoveStock,
            }
        );
        assert!(err.to_string().contains("field_rep"));
        assert!(err.to_string().contains("move_stock"));
    }

    #[test]
    fn sales_manager_allocates_but_cannot_touch_the_pool() {
        assert!(authorize(Role::SalesManager, Capability::Allocate).is_ok());
        assert!(authorize(Role::SalesManager, Capability::MoveStock).is_err());
        assert!(authorize(Role::SalesManager, Capability::ManageItems).is_err());
    }

    #[test]
    fn granted_capabilities_lists_only_grants() {
        assert_eq!(
            granted_capabilities(Role::ProductManager),
            vec![Capability::ManageItems, Capability::MoveStock]
        );
        assert!(granted_capabilities(Role::FieldRep).is_empty());
        assert_eq!(granted_capabilities(Role::Owner), Capability::ALL.to_vec());
    }
}
