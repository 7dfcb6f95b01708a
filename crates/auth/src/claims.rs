use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::UserId;

use crate::{Principal, Role};

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims the storefront expects once a token has
/// been decoded/verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Roles granted to the subject.
    pub roles: Vec<Role>,

    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl JwtClaims {
    pub fn into_principal(self) -> Principal {
        Principal::new(self.sub, self.roles)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("malformed or unsigned token: {0}")]
    Malformed(String),
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification lives in
/// [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_offset: i64, ttl: i64) -> (JwtClaims, DateTime<Utc>) {
        let now = Utc::now();
        let issued_at = now + Duration::seconds(issued_offset);
        (
            JwtClaims {
                sub: UserId::new(),
                roles: vec![Role::CUSTOMER],
                issued_at,
                expires_at: issued_at + Duration::seconds(ttl),
            },
            now,
        )
    }

    #[test]
    fn accepts_claims_inside_window() {
        let (c, now) = claims(-10, 600);
        assert_eq!(validate_claims(&c, now), Ok(()));
    }

    #[test]
    fn rejects_expired_claims() {
        let (c, now) = claims(-600, 10);
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::Expired));
    }

    #[test]
    fn rejects_future_issued_at() {
        let (c, now) = claims(60, 600);
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn rejects_inverted_window() {
        let (c, now) = claims(-10, 0);
        assert_eq!(
            validate_claims(&c, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn into_principal_keeps_identity_and_roles() {
        let (mut c, _) = claims(0, 60);
        c.roles = vec![Role::ADMIN];
        let sub = c.sub;
        let principal = c.into_principal();
        assert_eq!(principal.user_id(), sub);
        assert!(principal.is_admin());
    }
}
