//! Application services for the marketplace workflows.
//!
//! Services sit between the HTTP layer and the stores. They own the business
//! rules that span more than one document (checkout, basket expansion) and
//! map store failures into a consistent [`ServiceError`]. Each service is
//! generic over the store traits it needs, so the same code runs against
//! `InMemoryStores` in tests and `PostgresStores` in production.

pub mod baskets;
pub mod catalog;
pub mod checkout;
pub mod orders;

pub use baskets::BasketService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use orders::OrderQueries;

use thiserror::Error;

use tradepost_core::DomainError;
use tradepost_orders::Order;

use crate::store::StoreError;

/// Workflow failure, as surfaced to the HTTP layer.
///
/// The first three variants are deterministic outcomes of the request
/// itself. `Persistence` means the backend failed before anything was
/// written that the caller needs to know about. `Retraction` is different:
/// the order is durable, only the cleanup after it failed.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("duplicate item: {0}")]
    DuplicateItem(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// The order was recorded durably, but clearing the buyer's cart or
    /// retiring the purchased listings failed. Re-running
    /// [`CheckoutService::retract`] with the order's product ids finishes
    /// the job; both cleanup steps tolerate repetition.
    #[error("order {} was recorded but cleanup did not finish: {source}", .order.id())]
    Retraction { order: Box<Order>, source: StoreError },
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::DuplicateItem(msg) => ServiceError::DuplicateItem(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::NotFound => ServiceError::NotFound("resource".to_string()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
