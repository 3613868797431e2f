//! Login, registration, and account endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use bzc_core::models::User;

use crate::error::ClientResult;
use crate::session::SessionManager;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    user: User,
    token: String,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    full_name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// `POST /api/login`: authenticate and adopt the issued credential.
///
/// On success the session transitions to authenticated and the
/// `refresh_token` cookie lands in the client's cookie jar.
pub async fn login(
    session: &SessionManager,
    email: &str,
    password: &str,
) -> ClientResult<User> {
    let response: LoginResponse = session
        .request(Method::POST, "/api/login")
        .allow_anonymous()
        .json(&LoginRequest { email, password })?
        .send_json()
        .await?;
    session.login(&response.token)?;
    Ok(response.user)
}

/// `POST /api/users`: register a new account. Does not log in.
pub async fn register(
    session: &SessionManager,
    full_name: &str,
    email: &str,
    password: &str,
) -> ClientResult<()> {
    session
        .request(Method::POST, "/api/users")
        .allow_anonymous()
        .json(&RegisterRequest {
            full_name,
            email,
            password,
        })?
        .send_expect_success()
        .await
}

/// `GET /api/account`: the authenticated user's profile.
pub async fn account(session: &SessionManager) -> ClientResult<User> {
    session
        .request(Method::GET, "/api/account")
        .send_json()
        .await
}
