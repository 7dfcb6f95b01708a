//! Order access guard.
//!
//! - No IO
//! - No panics
//! - Pure policy check: callers resolve the order (and report `NotFound`)
//!   before asking the guard.

use thiserror::Error;

use storefront_core::UserId;

use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authorized to access this order")]
    NotOwner,

    #[error("administrator role required")]
    AdminRequired,
}

/// Read access: administrators, or the customer who placed the order.
pub fn authorize_order_read(principal: &Principal, owner: UserId) -> Result<(), AuthzError> {
    if principal.is_admin() || principal.user_id() == owner {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

/// Administrative operations (list all orders, status transitions).
pub fn require_admin(principal: &Principal) -> Result<(), AuthzError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn owner_may_read_own_order() {
        let owner = UserId::new();
        assert_eq!(authorize_order_read(&Principal::customer(owner), owner), Ok(()));
    }

    #[test]
    fn other_customer_is_denied() {
        let owner = UserId::new();
        let other = Principal::customer(UserId::new());
        assert_eq!(authorize_order_read(&other, owner), Err(AuthzError::NotOwner));
    }

    #[test]
    fn admin_may_read_any_order() {
        let admin = Principal::admin(UserId::new());
        assert_eq!(authorize_order_read(&admin, UserId::new()), Ok(()));
    }

    #[test]
    fn admin_check_ignores_unknown_roles() {
        let p = Principal::new(UserId::new(), vec![Role::new("support"), Role::CUSTOMER]);
        assert_eq!(require_admin(&p), Err(AuthzError::AdminRequired));
        assert_eq!(require_admin(&Principal::admin(UserId::new())), Ok(()));
    }
}
