//! Session lifecycle tests against an in-process stub of the bzCommerce
//! API: hydration, refresh-window behavior, single-flight refresh,
//! logout semantics, and route guards.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::Method;
use serde_json::json;
use url::Url;

use bzc_client::guard::{require_admin, require_user};
use bzc_client::{ClientConfig, ClientError, GuardOutcome, SessionManager};
use bzc_core::auth::{FileTokenStore, MemoryTokenStore, TokenClaims, TokenStore};

#[derive(Clone)]
struct StubState {
    refresh_calls: Arc<AtomicUsize>,
    refresh_ok: Arc<AtomicBool>,
    categories_ok: Arc<AtomicBool>,
    refresh_is_admin: Arc<AtomicBool>,
    last_bearer: Arc<Mutex<Option<String>>>,
    last_refresh_cookie: Arc<Mutex<Option<String>>>,
}

impl StubState {
    fn new() -> Self {
        Self {
            refresh_calls: Arc::new(AtomicUsize::new(0)),
            refresh_ok: Arc::new(AtomicBool::new(true)),
            categories_ok: Arc::new(AtomicBool::new(true)),
            refresh_is_admin: Arc::new(AtomicBool::new(true)),
            last_bearer: Arc::new(Mutex::new(None)),
            last_refresh_cookie: Arc::new(Mutex::new(None)),
        }
    }
}

fn make_token(exp_offset_secs: i64, is_admin: bool) -> String {
    let claims = TokenClaims {
        user_id: "7c9e6679-7425-40de-944b-e07fc1f90ae7".to_string(),
        email: "shopper@example.com".to_string(),
        is_admin,
        exp: Utc::now().timestamp() + exp_offset_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"stub-secret"),
    )
    .unwrap()
}

async fn refresh_handler(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_refresh_cookie.lock().unwrap() = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    // Widen the race window for concurrent callers.
    tokio::time::sleep(Duration::from_millis(50)).await;

    if state.refresh_ok.load(Ordering::SeqCst) {
        let token = make_token(3600, state.refresh_is_admin.load(Ordering::SeqCst));
        Json(json!({ "token": token })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid or expired token" })),
        )
            .into_response()
    }
}

async fn logout_handler() -> Response {
    Json(json!(null)).into_response()
}

async fn login_handler() -> Response {
    let token = make_token(3600, false);
    let mut response = Json(json!({
        "user": {
            "ID": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "FullName": "Ada Shopper",
            "Email": "shopper@example.com",
            "IsAdmin": false,
            "CreatedAt": "2025-01-01T00:00:00Z",
            "UpdatedAt": "2025-01-01T00:00:00Z"
        },
        "token": token
    }))
    .into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        "refresh_token=stub-refresh; Path=/; HttpOnly".parse().unwrap(),
    );
    response
}

async fn admin_categories_handler(State(state): State<StubState>, headers: HeaderMap) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from);
    *state.last_bearer.lock().unwrap() = bearer.clone();

    if bearer.is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Missing token" })),
        )
            .into_response();
    }
    if !state.categories_ok.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to load categories" })),
        )
            .into_response();
    }

    Json(json!([
        {
            "id": "00000000-0000-4000-8000-000000000001",
            "name": "Shoes",
            "slug": "shoes"
        },
        {
            "id": "00000000-0000-4000-8000-000000000002",
            "name": "Running",
            "slug": "running",
            "parent_id": "00000000-0000-4000-8000-000000000001"
        },
        {
            "id": "00000000-0000-4000-8000-000000000003",
            "name": "Trail",
            "slug": "trail",
            "parent_id": "00000000-0000-4000-8000-000000000002"
        },
        {
            "id": "00000000-0000-4000-8000-000000000004",
            "name": "Casual",
            "slug": "casual",
            "parent_id": "00000000-0000-4000-8000-000000000001"
        }
    ]))
    .into_response()
}

async fn spawn_stub(state: StubState) -> SocketAddr {
    let app = Router::new()
        .route("/api/refresh", post(refresh_handler))
        .route("/api/logout", post(logout_handler))
        .route("/api/login", post(login_handler))
        .route("/api/admin/categories", get(admin_categories_handler))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn session_for(addr: SocketAddr, stored_token: Option<&str>) -> Arc<SessionManager> {
    let config = ClientConfig::new(Url::parse(&format!("http://{addr}")).unwrap());
    let store = MemoryTokenStore::new();
    if let Some(token) = stored_token {
        store.save(token).unwrap();
    }
    Arc::new(SessionManager::new(config, Box::new(store)).unwrap())
}

#[tokio::test]
async fn near_expiry_token_triggers_refresh_before_request() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let near_expiry = make_token(90, true);
    let session = session_for(addr, Some(&near_expiry));

    let response = session
        .request(Method::GET, "/api/admin/categories")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 1);
    let forwarded = stub.last_bearer.lock().unwrap().clone().unwrap();
    assert_ne!(forwarded, near_expiry, "request must carry the refreshed token");
}

#[tokio::test]
async fn fresh_token_skips_refresh() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let fresh = make_token(300, true);
    let session = session_for(addr, Some(&fresh));

    let response = session
        .request(Method::GET, "/api/admin/categories")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 0);
    let forwarded = stub.last_bearer.lock().unwrap().clone().unwrap();
    assert_eq!(forwarded, fresh);
}

#[tokio::test]
async fn concurrent_requests_share_one_refresh() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(30, true)));

    let (a, b) = tokio::join!(
        session.request(Method::GET, "/api/admin/categories").send(),
        session.request(Method::GET, "/api/admin/categories").send(),
    );

    assert!(a.unwrap().status().is_success());
    assert!(b.unwrap().status().is_success());
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn request_without_credential_is_unauthorized() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, None);

    let err = session
        .request(Method::GET, "/api/admin/categories")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 0);
    assert!(!session.state().is_logged_in());
}

#[tokio::test]
async fn failed_refresh_forces_anonymous() {
    let stub = StubState::new();
    stub.refresh_ok.store(false, Ordering::SeqCst);
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(-10, true)));

    let err = session
        .request(Method::GET, "/api/admin/categories")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert!(!session.state().is_logged_in());
}

#[tokio::test]
async fn logout_clears_state_even_when_server_unreachable() {
    // Bind and immediately drop a listener so the port refuses connections.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = session_for(addr, Some(&make_token(3600, false)));
    session.hydrate().await;
    assert!(session.state().is_logged_in());

    session.logout().await;

    assert!(!session.state().is_logged_in());
    assert!(!session.state().is_admin());
}

#[tokio::test]
async fn hydrate_with_valid_token_skips_refresh() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(3600, true)));

    session.hydrate().await;

    let state = session.state();
    assert!(state.is_logged_in());
    assert!(state.is_admin());
    assert!(!state.is_loading());
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn hydrate_refreshes_expired_token() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(-60, false)));

    session.hydrate().await;

    assert!(session.state().is_logged_in());
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_hydrate_runs_the_check_once() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(-60, false)));

    tokio::join!(session.hydrate(), session.hydrate());

    assert!(session.state().is_logged_in());
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn hydrate_settles_anonymous_when_refresh_rejected() {
    let stub = StubState::new();
    stub.refresh_ok.store(false, Ordering::SeqCst);
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(-60, true)));

    session.hydrate().await;

    let state = session.state();
    assert!(!state.is_logged_in());
    assert!(!state.is_loading());
}

#[tokio::test]
async fn guards_wait_for_hydration_then_resolve() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(3600, true)));

    let guard_session = Arc::clone(&session);
    let guard = tokio::spawn(async move { require_admin(&guard_session).await });

    // The guard must still be pending while hydration has not run.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!guard.is_finished());

    session.hydrate().await;
    assert_eq!(guard.await.unwrap(), GuardOutcome::Allow);
}

#[tokio::test]
async fn guard_redirects_non_admin_to_unauthorized() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(3600, false)));

    session.hydrate().await;

    assert_eq!(require_user(&session).await, GuardOutcome::Allow);
    assert_eq!(
        require_admin(&session).await,
        GuardOutcome::RedirectToUnauthorized
    );
}

#[tokio::test]
async fn guard_redirects_anonymous_to_login() {
    let stub = StubState::new();
    stub.refresh_ok.store(false, Ordering::SeqCst);
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, None);

    session.hydrate().await;

    assert_eq!(require_user(&session).await, GuardOutcome::RedirectToLogin);
    assert_eq!(require_admin(&session).await, GuardOutcome::RedirectToLogin);
}

#[tokio::test]
async fn login_flow_carries_refresh_cookie() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, None);

    let user = bzc_client::api::auth::login(&session, "shopper@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(user.full_name, "Ada Shopper");
    assert!(session.state().is_logged_in());

    // The refresh_token cookie from login must ride along with refresh.
    assert!(session.refresh().await.is_some());
    let cookie = stub.last_refresh_cookie.lock().unwrap().clone().unwrap();
    assert!(cookie.contains("refresh_token=stub-refresh"));
}

#[tokio::test]
async fn admin_category_options_are_depth_annotated() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(3600, true)));

    let options = bzc_client::api::admin::category_options(&session)
        .await
        .unwrap();

    let names: Vec<_> = options.iter().map(|e| e.record.name.as_str()).collect();
    let depths: Vec<_> = options.iter().map(|e| e.depth).collect();
    assert_eq!(names, ["Shoes", "Running", "Trail", "Casual"]);
    assert_eq!(depths, [0, 1, 2, 1]);
}

#[tokio::test]
async fn api_error_body_is_surfaced() {
    let stub = StubState::new();
    stub.categories_ok.store(false, Ordering::SeqCst);
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(3600, true)));

    let err = bzc_client::api::admin::list_categories(&session)
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to load categories");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn file_store_shares_the_session_across_instances() {
    let stub = StubState::new();
    let addr = spawn_stub(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");

    let config = ClientConfig::new(Url::parse(&format!("http://{addr}")).unwrap());
    FileTokenStore::new(&path).save(&make_token(3600, false)).unwrap();

    let first = SessionManager::new(config.clone(), Box::new(FileTokenStore::new(&path))).unwrap();
    first.hydrate().await;
    assert!(first.state().is_logged_in());

    let second = SessionManager::new(config, Box::new(FileTokenStore::new(&path))).unwrap();
    second.hydrate().await;
    assert!(second.state().is_logged_in());
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn freshness_check_logs_out_on_rejected_refresh() {
    let stub = StubState::new();
    stub.refresh_ok.store(false, Ordering::SeqCst);
    let addr = spawn_stub(stub.clone()).await;
    let session = session_for(addr, Some(&make_token(30, true)));
    session.hydrate().await;

    session.check_freshness().await;

    assert!(!session.state().is_logged_in());
}
