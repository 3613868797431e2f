//! Route guards.
//!
//! A protected view calls a guard on mount. While the initial hydration
//! is still in flight the guard waits (the view renders a neutral
//! loading state); it then resolves exactly once.

use crate::session::{SessionManager, SessionState};

/// What a protected view should do after the session check resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    RedirectToLogin,
    RedirectToUnauthorized,
}

/// Guard for views that require any logged-in user.
pub async fn require_user(session: &SessionManager) -> GuardOutcome {
    let state = settled_state(session).await;
    if state.is_logged_in() {
        GuardOutcome::Allow
    } else {
        GuardOutcome::RedirectToLogin
    }
}

/// Guard for admin-only views: anonymous users go to login, logged-in
/// non-admins to the unauthorized view.
pub async fn require_admin(session: &SessionManager) -> GuardOutcome {
    let state = settled_state(session).await;
    if !state.is_logged_in() {
        GuardOutcome::RedirectToLogin
    } else if !state.is_admin() {
        GuardOutcome::RedirectToUnauthorized
    } else {
        GuardOutcome::Allow
    }
}

/// Wait until the session has finished its initial credential check.
async fn settled_state(session: &SessionManager) -> SessionState {
    let mut rx = session.subscribe();
    loop {
        let state = rx.borrow_and_update().clone();
        if !state.is_loading() {
            return state;
        }
        if rx.changed().await.is_err() {
            // Session dropped mid-check; treat as logged out.
            return state;
        }
    }
}
