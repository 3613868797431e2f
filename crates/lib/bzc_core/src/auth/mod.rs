//! Client-side authentication logic.
//!
//! Provides access-token decoding and the persisted credential slot
//! shared by `bzc_client` and the CLI.

pub mod store;
pub mod token;

pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::{AccessToken, TokenClaims};

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential string could not be parsed. Treated everywhere as
    /// "no valid session", never surfaced as a distinct user-facing error.
    #[error("Token decode error: {0}")]
    Decode(String),

    #[error("Credential storage error: {0}")]
    Storage(#[from] std::io::Error),
}
