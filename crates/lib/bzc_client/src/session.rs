//! Session lifecycle management.
//!
//! The [`SessionManager`] owns the single client-held credential. It
//! hydrates from the persisted slot on startup, refreshes the token
//! proactively before expiry, and broadcasts derived state (logged
//! in / admin / loading) over a watch channel so route guards and
//! navigation observe every transition.
//!
//! Refreshes are single-flight: concurrent callers that find the token
//! near expiry share one in-flight round-trip instead of each hitting
//! the refresh endpoint.

use std::sync::Arc;

use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use bzc_core::auth::{AccessToken, TokenStore};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Before hydration has started.
    Uninitialized,
    /// Initial credential check/refresh in flight.
    Checking,
    Authenticated,
    Anonymous,
}

/// Derived session state, broadcast to subscribers on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    is_admin: bool,
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    /// Admin only when authenticated with an admin claim.
    pub fn is_admin(&self) -> bool {
        self.is_logged_in() && self.is_admin
    }

    /// True only before the initial hydration resolves.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Uninitialized | SessionPhase::Checking
        )
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    token: String,
}

/// Owns the client-held credential and gates all authenticated calls.
pub struct SessionManager {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ClientConfig,
    store: Box<dyn TokenStore>,
    state: watch::Sender<SessionState>,
    refresh_lock: Mutex<()>,
}

impl SessionManager {
    /// Create a session manager over the given credential store.
    ///
    /// The HTTP client keeps a cookie store so the httpOnly
    /// `refresh_token` cookie set at login rides along with refresh and
    /// logout calls.
    pub fn new(config: ClientConfig, store: Box<dyn TokenStore>) -> ClientResult<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        let (state, _) = watch::channel(SessionState {
            phase: SessionPhase::Uninitialized,
            is_admin: false,
        });
        Ok(Self {
            http,
            config,
            store,
            state,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Initial credential check. Resolves the loading state exactly once;
    /// later calls are no-ops.
    ///
    /// A persisted token that is still valid authenticates without a
    /// network call. A missing, expired, or undecodable token triggers
    /// one silent refresh; if that fails the slot is cleared and the
    /// session settles on `Anonymous`.
    pub async fn hydrate(&self) {
        // Claim the Uninitialized -> Checking transition atomically so
        // concurrent callers run the initial check at most once.
        let claimed = self.state.send_if_modified(|state| {
            if state.phase == SessionPhase::Uninitialized {
                state.phase = SessionPhase::Checking;
                state.is_admin = false;
                true
            } else {
                false
            }
        });
        if !claimed {
            return;
        }

        let stored = match self.stored_token() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("failed to read persisted credential: {e}");
                None
            }
        };

        match stored {
            Some(token) if token.is_valid_at(Utc::now()) => {
                debug!("hydrated from persisted credential");
                self.set_authenticated(&token);
            }
            _ => match self.refresh().await {
                Some(token) => self.set_authenticated(&token),
                None => {
                    if let Err(e) = self.store.clear() {
                        warn!("failed to clear credential slot: {e}");
                    }
                    self.set_state(SessionPhase::Anonymous, false);
                }
            },
        }
    }

    /// Accept a freshly issued credential (from a login API response).
    ///
    /// Fails closed: an undecodable token leaves the session `Anonymous`
    /// with the slot cleared rather than surfacing an error. Only storage
    /// failures propagate.
    pub fn login(&self, token: &str) -> ClientResult<()> {
        match AccessToken::decode(token) {
            Ok(decoded) => {
                self.store.save(token)?;
                self.set_authenticated(&decoded);
                Ok(())
            }
            Err(e) => {
                warn!("rejecting undecodable login token: {e}");
                self.store.clear()?;
                self.set_state(SessionPhase::Anonymous, false);
                Ok(())
            }
        }
    }

    /// End the session. Always succeeds from the client's perspective:
    /// the slot is cleared and the state transitions to `Anonymous`
    /// before the best-effort server notification, whose failure is only
    /// logged.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!("failed to clear credential slot: {e}");
        }
        self.set_state(SessionPhase::Anonymous, false);

        let url = match self.config.endpoint("/api/logout") {
            Ok(url) => url,
            Err(e) => {
                warn!("logout notification skipped: {e}");
                return;
            }
        };
        match self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
        {
            Ok(_) => info!("logged out"),
            Err(e) => warn!("logout request failed: {e}"),
        }
    }

    /// Exchange the refresh-token cookie for a new access token.
    ///
    /// Single-flight with every other refresh trigger. On success the new
    /// token is persisted and broadcast; on any failure (non-success
    /// status, malformed body) this returns `None` and the caller decides
    /// the next action.
    pub async fn refresh(&self) -> Option<AccessToken> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Background freshness check: refreshes when the stored token is
    /// near expiry, logs out when it is undecodable or the refresh is
    /// rejected. One tick of the periodic task.
    pub async fn check_freshness(&self) {
        let raw = match self.store.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!("freshness check skipped: {e}");
                return;
            }
        };
        match AccessToken::decode(&raw) {
            Err(e) => {
                warn!("persisted credential undecodable: {e}");
                self.logout().await;
            }
            Ok(token) if token.expires_within(self.config.refresh_window, Utc::now()) => {
                if self.refresh().await.is_none() {
                    self.logout().await;
                }
            }
            Ok(_) => {}
        }
    }

    /// Spawn the periodic freshness task. The task funnels through the
    /// same single-flight refresh as per-request checks.
    pub fn spawn_refresh_task(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(session.config.refresh_poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so checks
            // start one full interval after startup.
            interval.tick().await;
            loop {
                interval.tick().await;
                session.check_freshness().await;
            }
        })
    }

    /// Obtain a token usable for an authenticated request, refreshing
    /// first when the stored one is near expiry.
    ///
    /// No credential at all is an immediate `Unauthorized`; a near-expiry
    /// or expired credential triggers one shared refresh round-trip.
    pub(crate) async fn fresh_token(&self) -> ClientResult<AccessToken> {
        let now = Utc::now();
        let Some(token) = self.stored_token()? else {
            return Err(ClientError::Unauthorized(
                "no credential available".to_string(),
            ));
        };
        if !token.expires_within(self.config.refresh_window, now) {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // A concurrent caller may have refreshed while we waited.
        if let Ok(Some(token)) = self.stored_token()
            && !token.expires_within(self.config.refresh_window, Utc::now())
        {
            return Ok(token);
        }
        match self.refresh_locked().await {
            Some(token) => Ok(token),
            None => Err(ClientError::Unauthorized(
                "token refresh failed".to_string(),
            )),
        }
    }

    async fn refresh_locked(&self) -> Option<AccessToken> {
        let url = match self.config.endpoint("/api/refresh") {
            Ok(url) => url,
            Err(e) => {
                warn!("refresh skipped: {e}");
                return None;
            }
        };
        let response = match self.http.post(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("refresh request failed: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            info!(status = %response.status(), "refresh rejected");
            return None;
        }
        let body: RefreshResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("malformed refresh response: {e}");
                return None;
            }
        };
        let token = match AccessToken::decode(&body.token) {
            Ok(token) => token,
            Err(e) => {
                warn!("refresh returned undecodable token: {e}");
                return None;
            }
        };
        if let Err(e) = self.store.save(token.raw()) {
            warn!("failed to persist refreshed credential: {e}");
        }
        self.set_authenticated(&token);
        debug!("token refreshed");
        Some(token)
    }

    /// Read and decode the persisted credential. An undecodable value
    /// reads as absent.
    fn stored_token(&self) -> ClientResult<Option<AccessToken>> {
        let Some(raw) = self.store.load()? else {
            return Ok(None);
        };
        match AccessToken::decode(&raw) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!("persisted credential undecodable: {e}");
                Ok(None)
            }
        }
    }

    fn set_authenticated(&self, token: &AccessToken) {
        self.set_state(SessionPhase::Authenticated, token.is_admin());
    }

    fn set_state(&self, phase: SessionPhase, is_admin: bool) {
        self.state.send_replace(SessionState { phase, is_admin });
    }
}
