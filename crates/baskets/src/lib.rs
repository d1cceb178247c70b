//! Baskets domain module (carts and wishlists).
//!
//! This crate contains business rules for baskets, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod basket;

pub use basket::{Basket, BasketEntry, BasketKind};
