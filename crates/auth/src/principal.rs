use storefront_core::UserId;

use crate::Role;

/// A verified caller identity for a single request.
///
/// Built by the transport layer after token validation; core operations trust
/// it as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    roles: Vec<Role>,
}

impl Principal {
    pub fn new(user_id: UserId, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    pub fn customer(user_id: UserId) -> Self {
        Self::new(user_id, vec![Role::CUSTOMER])
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, vec![Role::ADMIN])
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r.as_str() == Role::ADMIN.as_str())
    }
}
