//! # bzc_client
//!
//! HTTP client library for the bzCommerce API: session lifecycle
//! management with proactive token refresh, authenticated requests, route
//! guards, and typed endpoint wrappers.

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod request;
pub mod session;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use guard::GuardOutcome;
pub use request::ApiRequest;
pub use session::{SessionManager, SessionPhase, SessionState};
