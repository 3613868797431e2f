//! Typed endpoint wrappers.
//!
//! Only the surface the session manager and category tree touch is
//! bound here; the rest of the storefront API is out of scope.

pub mod admin;
pub mod auth;
pub mod catalog;
