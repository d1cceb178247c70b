//! Document store boundary for the marketplace collections.
//!
//! This module defines infrastructure-facing abstractions over the three
//! persisted collections (products, baskets, orders) without making any
//! storage assumptions. Two backends are provided: [`InMemoryStores`] for
//! tests and local development, and [`PostgresStores`] for production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStores;
pub use postgres::PostgresStores;
pub use r#trait::{
    BasketStore, DynBasketStore, DynOrderStore, DynProductStore, OrderStore, ProductStore,
    PushOutcome, StoreError,
};
