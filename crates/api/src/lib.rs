//! HTTP surface of the marketplace. See [`app`] for router construction.

pub mod app;
