use axum::http::{HeaderMap, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::Value;

use locasso_auth::domain::repository::UserRepository;
use locasso_auth::infra::db::DbUserRepository;
use locasso_testing::auth::{APPLE_ISSUER, GOOGLE_ISSUER, MockIdentity};

use crate::helpers::{test_db, test_server, test_server_with_principal, test_state, user_count};

fn with_headers(mut request: TestRequest, headers: &HeaderMap) -> TestRequest {
    for (name, value) in headers {
        request = request.add_header(name.clone(), value.clone());
    }
    request
}

async fn sign_in(server: &TestServer, headers: &HeaderMap) -> axum_test::TestResponse {
    with_headers(server.post("/api/auth/signin"), headers).await
}

// ── POST /api/auth/signin ────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_in_new_user_from_proxy_headers() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), false));
    let identity = MockIdentity::new("abc123", "alice@example.com");

    let res = sign_in(&server, &identity.proxy_headers()).await;

    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["isNewUser"], true);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], Value::Null);
    assert_eq!(body["photoUrl"], Value::Null);
    assert_eq!(body["role"], "Traveler");
    assert!(body["userId"].is_string());
    assert_eq!(user_count(&db).await, 1);
}

#[tokio::test]
async fn should_return_same_user_on_second_sign_in() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), false));
    let identity = MockIdentity::new("abc123", "alice@example.com").name("Alice");

    let first: Value = sign_in(&server, &identity.proxy_headers()).await.json();
    let second: Value = sign_in(&server, &identity.proxy_headers()).await.json();

    assert_eq!(first["isNewUser"], true);
    assert_eq!(second["isNewUser"], false);
    assert_eq!(first["userId"], second["userId"]);
    assert_eq!(second["name"], "Alice");
    assert_eq!(user_count(&db).await, 1);
}

#[tokio::test]
async fn should_sign_in_from_identity_token() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), false));
    let identity = MockIdentity::new("google-sub-1", "g@example.com")
        .name("Gina")
        .photo_url("https://img.example.com/g.png");

    let res = sign_in(&server, &identity.id_token_headers(GOOGLE_ISSUER)).await;

    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["name"], "Gina");
    assert_eq!(body["photoUrl"], "https://img.example.com/g.png");

    let stored = DbUserRepository { db }
        .find_by_external_id("google-sub-1", "google")
        .await
        .unwrap();
    assert!(stored.is_some(), "provider should be inferred from the issuer");
}

#[tokio::test]
async fn should_prefer_proxy_headers_over_identity_token() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), false));
    let proxied = MockIdentity::new("proxy-id", "proxy@example.com");
    let tokened = MockIdentity::new("token-id", "token@example.com");

    let mut headers = proxied.proxy_headers();
    headers.extend(tokened.id_token_headers(APPLE_ISSUER));
    let body: Value = sign_in(&server, &headers).await.json();

    assert_eq!(body["email"], "proxy@example.com");
    let repo = DbUserRepository { db };
    assert!(repo.find_by_external_id("proxy-id", "apple").await.unwrap().is_some());
    assert!(repo.find_by_external_id("token-id", "apple").await.unwrap().is_none());
}

#[tokio::test]
async fn should_sign_in_from_upstream_principal() {
    let db = test_db().await;
    let identity = MockIdentity::new("principal-1", "p@example.com").name("Pat");
    let server = test_server_with_principal(test_state(db.clone(), false), identity.principal());

    let res = server.post("/api/auth/signin").await;

    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["name"], "Pat");
    let stored = DbUserRepository { db }
        .find_by_external_id("principal-1", "apple")
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn should_reject_sign_in_without_evidence() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), false));

    let res = server.post("/api/auth/signin").await;

    res.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = res.json();
    assert_eq!(body["kind"], "MISSING_CLAIMS");
    assert_eq!(user_count(&db).await, 0);
}

#[tokio::test]
async fn should_reject_token_without_email() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), false));
    let identity = MockIdentity::new("abc123", "");

    let res = sign_in(&server, &identity.id_token_headers(APPLE_ISSUER)).await;

    res.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(user_count(&db).await, 0);
}

#[tokio::test]
async fn should_sign_in_from_dev_query_in_dev_mode() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), true));

    let res = server
        .post("/api/auth/signin")
        .add_query_param("dev", "true")
        .add_query_param("id", "dev-user")
        .add_query_param("email", "dev@example.com")
        .await;

    res.assert_status_ok();
    let stored = DbUserRepository { db }
        .find_by_external_id("dev-user", "dev")
        .await
        .unwrap();
    assert!(stored.is_some(), "developer provider should default to dev");
}

#[tokio::test]
async fn should_sign_in_from_dev_body_in_dev_mode() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), true));
    let identity = MockIdentity::new("dev-body", "body@example.com").provider("google");

    let res = with_headers(server.post("/api/auth/signin"), &MockIdentity::dev_flag_headers())
        .json(&identity.dev_body())
        .await;

    res.assert_status_ok();
    let stored = DbUserRepository { db }
        .find_by_external_id("dev-body", "google")
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn should_ignore_dev_params_outside_dev_mode() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), false));
    let identity = MockIdentity::new("dev-user", "dev@example.com");

    let mut request = server.post("/api/auth/signin");
    for (name, value) in identity.dev_query() {
        request = request.add_query_param(name, value);
    }
    let res = request.await;

    res.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(user_count(&db).await, 0);
}

// ── GET /api/auth/me ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_echo_claims_with_unknown_placeholders() {
    let db = test_db().await;
    let server = test_server(test_state(db.clone(), false));
    let identity = MockIdentity::new("abc123", "alice@example.com");

    let res = with_headers(server.get("/api/auth/me"), &identity.id_token_headers(APPLE_ISSUER)).await;

    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["id"], "abc123");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Unknown");
    assert_eq!(user_count(&db).await, 0, "me must not register anyone");
}

#[tokio::test]
async fn should_reject_me_without_evidence() {
    let server = test_server(test_state(test_db().await, false));

    let res = server.get("/api/auth/me").await;

    res.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = res.json();
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

// ── GET /api/auth/diagnostic ─────────────────────────────────────────────────

#[tokio::test]
async fn should_not_route_diagnostic_outside_dev_mode() {
    let server = test_server(test_state(test_db().await, false));

    let res = server.get("/api/auth/diagnostic").await;

    res.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_mask_sensitive_claims_in_diagnostic() {
    let server = test_server(test_state(test_db().await, true));
    let identity = MockIdentity::new("abc123xyz", "alice@example.com");

    let res = with_headers(
        server.get("/api/auth/diagnostic"),
        &identity.id_token_headers(APPLE_ISSUER),
    )
    .await;

    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["isAuthenticated"], true);
    assert_eq!(body["source"], "id_token");
    assert_eq!(body["hasIdToken"], true);

    let claims = body["claims"].as_array().unwrap();
    let value_of = |typ: &str| {
        claims
            .iter()
            .find(|c| c["type"] == typ)
            .map(|c| c["value"].clone())
            .unwrap()
    };
    assert_eq!(value_of("sub"), "abc...yz");
    assert_eq!(value_of("email"), "ali...om");
    assert_eq!(value_of("name"), "[NULL]");
    assert_eq!(value_of("iss"), APPLE_ISSUER);
}

#[tokio::test]
async fn should_report_unauthenticated_diagnostic() {
    let server = test_server(test_state(test_db().await, true));

    let body: Value = server.get("/api/auth/diagnostic").await.json();

    assert_eq!(body["isAuthenticated"], false);
    assert_eq!(body["source"], Value::Null);
    assert_eq!(body["hasIdToken"], false);
    assert!(body["claims"].as_array().unwrap().is_empty());
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_ready_when_store_answers() {
    let server = test_server(test_state(test_db().await, false));

    server.get("/healthz").await.assert_status_ok();
    let res = server.get("/readyz").await;
    res.assert_status_ok();
    assert!(res.headers().contains_key("x-request-id"));
}
