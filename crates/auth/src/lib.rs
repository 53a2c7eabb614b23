//! `promostock-auth` — pure authorization boundary for the allocation ledger.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod actor;
pub mod authorize;
pub mod capabilities;
pub mod claims;
pub mod roles;
pub mod token;

pub use actor::Actor;
pub use authorize::{AuthzError, authorize, granted_capabilities, has_capability};
pub use capabilities::{Capability, UnknownCapability};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use roles::{Role, UnknownRole};
pub use token::{Hs256JwtValidator, JwtValidator, TokenError};
