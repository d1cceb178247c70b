//! Product listings domain module.
//!
//! This crate contains business rules for listings, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod listing;

pub use listing::{Category, NewListing, Product, MAX_LISTING_PHOTOS};
