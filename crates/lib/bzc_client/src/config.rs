//! Client configuration.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;
use url::Url;

use bzc_core::auth::FileTokenStore;
use bzc_core::auth::token::DEFAULT_REFRESH_WINDOW_SECS;

use crate::error::{ClientError, ClientResult};

/// Interval between background token freshness checks: 5 minutes.
pub const DEFAULT_REFRESH_POLL_SECS: u64 = 5 * 60;

/// Configuration for the bzCommerce client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the API (e.g. "http://localhost:8080").
    pub base_url: Url,
    /// Duration before expiry during which a token is proactively renewed.
    pub refresh_window: Duration,
    /// Interval between background freshness checks.
    pub refresh_poll_interval: StdDuration,
    /// Path of the persisted credential slot.
    pub token_path: PathBuf,
}

impl ClientConfig {
    /// Configuration with defaults for the given API base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            refresh_window: Duration::seconds(DEFAULT_REFRESH_WINDOW_SECS),
            refresh_poll_interval: StdDuration::from_secs(DEFAULT_REFRESH_POLL_SECS),
            token_path: FileTokenStore::default_path(),
        }
    }

    /// Reads configuration from environment variables with sensible
    /// defaults.
    ///
    /// | Variable                 | Default                          |
    /// |--------------------------|----------------------------------|
    /// | `BZC_API_BASE_URL`       | `http://localhost:8080`          |
    /// | `BZC_REFRESH_WINDOW_SECS`| `120`                            |
    /// | `BZC_REFRESH_POLL_SECS`  | `300`                            |
    /// | `BZC_TOKEN_PATH`         | `<data dir>/bzcommerce/token`    |
    pub fn from_env() -> ClientResult<Self> {
        let base_url = std::env::var("BZC_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".into());
        let mut config = Self::new(Url::parse(&base_url)?);

        if let Ok(v) = std::env::var("BZC_REFRESH_WINDOW_SECS")
            && let Ok(secs) = v.parse::<i64>()
        {
            config.refresh_window = Duration::seconds(secs);
        }
        if let Ok(v) = std::env::var("BZC_REFRESH_POLL_SECS")
            && let Ok(secs) = v.parse::<u64>()
        {
            config.refresh_poll_interval = StdDuration::from_secs(secs);
        }
        if let Ok(path) = std::env::var("BZC_TOKEN_PATH") {
            config.token_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Resolve an API path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url.join(path).map_err(ClientError::from)
    }
}
