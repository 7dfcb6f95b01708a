//! `storefront-auth` — authentication/authorization boundary.
//!
//! Identity is resolved once per request (from a verified token) into a
//! [`Principal`] that is passed explicitly into every order operation. This
//! crate is decoupled from HTTP and storage.

pub mod claims;
pub mod guard;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use guard::{AuthzError, authorize_order_read, require_admin};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use principal::Principal;
pub use roles::Role;
