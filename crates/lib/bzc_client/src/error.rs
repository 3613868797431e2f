//! Client error types.
//!
//! Expected auth failures (undecodable credential, rejected refresh) are
//! not errors: the session resolves to a logged-out state instead. The
//! variants here are what callers of the request layer see.

use thiserror::Error;

use bzc_core::auth::AuthError;

/// Convenience alias for client operation results.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the bzCommerce client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No usable credential could be obtained for an authenticated
    /// request. The caller decides UI treatment (usually a redirect to
    /// login).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The API returned a non-success status with an error body.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (offline, DNS, connection refused).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
