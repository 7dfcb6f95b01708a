//! Infrastructure and service error model.

use thiserror::Error;

use storefront_auth::AuthzError;
use storefront_catalog::ProductId;
use storefront_core::DomainError;
use storefront_orders::InvalidStatus;

/// Store operation error.
///
/// These are **infrastructure errors** (storage, locking, decoding) as opposed
/// to domain outcomes such as insufficient stock, which stores report as values.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lock poisoned")]
    Poisoned,

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("record missing: {0}")]
    Missing(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// A value the domain accepts but the backing column cannot hold.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of an order operation, as surfaced to callers.
///
/// Every failure is distinguishable; stock failures name the offending line.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("product {product_id} not found (line {line_no})")]
    ProductNotFound { line_no: u32, product_id: ProductId },

    #[error(
        "insufficient stock for product {product_id} (line {line_no}): requested {requested}, available {available}"
    )]
    InsufficientStock {
        line_no: u32,
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("order not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    InvalidStatus(String),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<StoreError> for OrderError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::OutOfRange(msg) => OrderError::Validation(msg),
            other => OrderError::Persistence(other.to_string()),
        }
    }
}

impl From<AuthzError> for OrderError {
    fn from(_: AuthzError) -> Self {
        OrderError::Unauthorized
    }
}

impl From<InvalidStatus> for OrderError {
    fn from(value: InvalidStatus) -> Self {
        OrderError::InvalidStatus(value.to_string())
    }
}

impl From<DomainError> for OrderError {
    fn from(value: DomainError) -> Self {
        if value.is_caller_fault() {
            OrderError::Validation(value.message().to_string())
        } else {
            OrderError::Persistence(value.to_string())
        }
    }
}
