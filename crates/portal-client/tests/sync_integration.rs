//! Integration tests for the sync client against a mock session service.

use std::time::Duration;

use portal_client::{CachePhase, ClientConfig, RetryConfig, SyncClient, SyncPolicy};
use portal_types::{Principal, RoleTag};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn agent() -> Principal {
    Principal::new("u2", "c@d.com", RoleTag::Agent)
}

fn client(server: &MockServer) -> SyncClient {
    SyncClient::new(
        ClientConfig::new(server.uri()).with_request_timeout(Duration::from_secs(2)),
    )
    .unwrap()
}

fn retrying_client(server: &MockServer) -> SyncClient {
    let policy = SyncPolicy::RetryWithBackoff(
        RetryConfig::new()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(1))
            .with_jitter(false),
    );
    SyncClient::new(ClientConfig::new(server.uri()).with_sync_policy(policy)).unwrap()
}

// =============================================================================
// Push
// =============================================================================

#[tokio::test]
async fn test_push_login_posts_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/sync"))
        .and(body_json(json!({
            "action": "login",
            "user": {"id": "u2", "email": "c@d.com", "role": "agent"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.push_login(&agent()).await;

    let snapshot = client.snapshot();
    assert_eq!(snapshot.principal, Some(agent()));
    assert_eq!(snapshot.phase, CachePhase::Ready);
}

#[tokio::test]
async fn test_push_logout_clears_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/sync"))
        .and(body_json(json!({"action": "logout"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let client = client(&server);
    client.push_login(&agent()).await;
    client.push_logout().await;

    assert_eq!(client.snapshot().principal, None);
}

#[tokio::test]
async fn test_rejected_login_is_swallowed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/sync"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"success": false, "error": "invalid user"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.push_login(&agent()).await;

    // Local cache still holds the hint; the server stays authoritative on the next pull.
    assert_eq!(client.snapshot().principal, Some(agent()));
}

// =============================================================================
// Pull
// =============================================================================

#[tokio::test]
async fn test_pull_adopts_server_principal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": {"id": "u2", "email": "c@d.com", "name": "Casey", "role": "agent"}
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let principal = client.pull_validate().await;

    assert_eq!(principal, Some(agent().with_display_name("Casey")));
    assert_eq!(client.snapshot().phase, CachePhase::Ready);
}

#[tokio::test]
async fn test_unauthorized_pull_clears_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "error": "No session"})),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    client.push_login(&agent()).await;

    assert_eq!(client.pull_validate().await, None);
    assert_eq!(client.snapshot().principal, None);
}

#[tokio::test]
async fn test_failed_pull_leaves_cache_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client(&server);
    client.push_login(&agent()).await;
    let before = client.snapshot();

    assert_eq!(client.pull_validate().await, Some(agent()));
    assert_eq!(client.snapshot(), before);
}

#[tokio::test]
async fn test_undecodable_pull_leaves_cache_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client(&server);
    let before = client.snapshot();

    assert_eq!(client.pull_validate().await, None);
    assert_eq!(client.snapshot(), before);
    assert_eq!(before.phase, CachePhase::Loading);
}

#[tokio::test]
async fn test_start_settles_after_failed_pull() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server);
    let snapshot = client.start().await;

    assert_eq!(snapshot.phase, CachePhase::Ready);
    assert_eq!(snapshot.principal, None);
}

// =============================================================================
// Unreachable server
// =============================================================================

/// Base URL of a local port with nothing listening on it
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn unreachable_client(policy: SyncPolicy) -> SyncClient {
    SyncClient::new(
        ClientConfig::new(closed_port_url())
            .with_connect_timeout(Duration::from_millis(500))
            .with_request_timeout(Duration::from_secs(1))
            .with_sync_policy(policy),
    )
    .unwrap()
}

#[tokio::test]
async fn test_unreachable_server_keeps_local_state() {
    let client = unreachable_client(SyncPolicy::BestEffort);

    client.push_login(&agent()).await;
    let after_login = client.snapshot();
    assert_eq!(after_login.principal, Some(agent()));
    assert_eq!(after_login.phase, CachePhase::Ready);

    assert_eq!(client.pull_validate().await, Some(agent()));
    assert_eq!(client.snapshot(), after_login);

    client.push_logout().await;
    let after_logout = client.snapshot();
    assert_eq!(after_logout.principal, None);

    assert_eq!(client.pull_validate().await, None);
    assert_eq!(client.snapshot(), after_logout);
}

#[tokio::test]
async fn test_unreachable_server_with_retries() {
    let policy = SyncPolicy::RetryWithBackoff(
        RetryConfig::new()
            .with_max_attempts(2)
            .with_base_delay(Duration::from_millis(1))
            .with_jitter(false),
    );
    let client = unreachable_client(policy);

    client.push_login(&agent()).await;
    let before = client.snapshot();
    assert_eq!(client.pull_validate().await, Some(agent()));
    assert_eq!(client.snapshot(), before);
}

#[tokio::test]
async fn test_start_against_unreachable_server_settles() {
    let client = unreachable_client(SyncPolicy::BestEffort);
    let snapshot = client.start().await;

    assert_eq!(snapshot.phase, CachePhase::Ready);
    assert_eq!(snapshot.principal, None);
}

// =============================================================================
// Session cookie round trip
// =============================================================================

#[tokio::test]
async fn test_session_cookie_sent_on_pull() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/sync"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "portal_session=abc123; Path=/; HttpOnly")
                .set_body_json(json!({"success": true})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .and(header("cookie", "portal_session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": {"id": "u2", "email": "c@d.com", "role": "agent"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.push_login(&agent()).await;
    assert_eq!(client.pull_validate().await, Some(agent()));
}

// =============================================================================
// Sync policy
// =============================================================================

#[tokio::test]
async fn test_best_effort_does_not_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).pull_validate().await;
}

#[tokio::test]
async fn test_backoff_retries_transient_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": {"id": "u2", "email": "c@d.com", "role": "agent"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = retrying_client(&server);
    assert_eq!(client.pull_validate().await, Some(agent()));
}

#[tokio::test]
async fn test_backoff_does_not_retry_client_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/sync"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    retrying_client(&server).push_login(&agent()).await;
}

#[test]
fn test_invalid_base_url_rejected() {
    let err = SyncClient::new(ClientConfig::new("localhost:8080")).unwrap_err();
    assert!(!err.is_retryable());
}
