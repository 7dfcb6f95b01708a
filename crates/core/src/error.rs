//! Errors raised by pure domain rules.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Failure of a domain rule.
///
/// `Validation` and `InvalidId` come from caller input and are rejected before
/// any side effect. `InvariantViolation` means stored or computed state is
/// inconsistent, which is never the caller's fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// True when the error stems from caller input rather than system state.
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidId(_))
    }

    /// The bare message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::InvariantViolation(m) | Self::InvalidId(m) => m,
        }
    }
}
