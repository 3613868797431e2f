//! # bzc_core
//!
//! Core domain logic for the bzCommerce client: access-token lifecycle,
//! persisted credential storage, and the category tree builder.

pub mod auth;
pub mod catalog;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
