//! Wire models for the bzCommerce API.
//!
//! These mirror the backend's JSON shapes. Nullable columns that the
//! backend serializes as `sql.NullString` wrappers are normalized into
//! plain `Option`s at this boundary; nothing past this module sees the
//! `{"String": .., "Valid": ..}` form.

pub mod auth;
pub mod catalog;
pub mod nullable;

pub use auth::User;
pub use catalog::{Breadcrumb, Category, PaginatedResponse, Product, ProductResponse, Variant};
