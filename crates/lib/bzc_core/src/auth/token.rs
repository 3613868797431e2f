//! Access-token decoding and freshness checks.
//!
//! The client never verifies signatures; it holds no signing secret.
//! Tokens are decoded only to read the claims; the server remains the
//! authority on token validity.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Duration before expiry during which a token is proactively renewed:
/// 2 minutes.
pub const DEFAULT_REFRESH_WINDOW_SECS: i64 = 2 * 60;

/// Claims embedded in a bzCommerce access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID (UUID string).
    pub user_id: String,
    /// User email.
    pub email: String,
    /// Admin flag.
    pub is_admin: bool,
    /// Expiry (unix timestamp, seconds).
    pub exp: i64,
}

/// A decoded access token: the raw signed string plus its claims.
#[derive(Debug, Clone)]
pub struct AccessToken {
    raw: String,
    claims: TokenClaims,
}

impl AccessToken {
    /// Decode the payload of a signed token without verifying the
    /// signature or expiry. Expired tokens still decode; the caller
    /// needs the claims to decide whether to refresh.
    pub fn decode(raw: &str) -> Result<Self, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<TokenClaims>(raw, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| AuthError::Decode(e.to_string()))?;

        Ok(Self {
            raw: raw.to_string(),
            claims: data.claims,
        })
    }

    /// The raw signed token string, as sent in `Authorization` headers.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The decoded claims.
    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// Expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.claims.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token is still valid at `now`. A token expiring exactly
    /// at `now` is already expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    /// Whether the token expires within `window` of `now` (or already has).
    pub fn expires_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at() - now < window
    }

    /// Admin claim shortcut.
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin
    }
}
