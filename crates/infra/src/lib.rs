//! tradepost-infra provides the persistence layer and the application
//! services that drive the marketplace workflows.
//!
//! The store traits in [`store`] abstract over an in-memory backend used for
//! tests and local development and a PostgreSQL backend used in production.
//! The services in [`services`] implement the business workflows (basket
//! management, checkout, catalog, order history) on top of those traits.

pub mod services;
pub mod store;


pub use services::{
    BasketService, CatalogService, CheckoutService, OrderQueries, ServiceError, ServiceResult,
};
pub use store::{
    BasketStore, DynBasketStore, DynOrderStore, DynProductStore, InMemoryStores, OrderStore,
    PostgresStores, ProductStore, PushOutcome, StoreError,
};
