use licenseguard::{
    FailureKind, LicenseGuardConfig, LicenseGuardError, LicenseRecord, LicenseServerClient,
    LicenseSource,
};
use std::time::Duration;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "AAAA-BBBB-CCCC";

const VALID_BODY: &str = r#"{
    "data": {
        "productId": 5,
        "userId": 9,
        "username": "kelvin",
        "license": "AAAA-BBBB-CCCC",
        "boundIps": ["10.0.0.1"],
        "sponsored": true,
        "active": true,
        "permanent": false,
        "expires": "2031-05-04 03:02:01",
        "expiresAt": "2031-05-04 03:02:01"
    },
    "success": true
}"#;

fn config_for(server: &MockServer) -> LicenseGuardConfig {
    LicenseGuardConfig {
        server_url: format!("{}/api/v1/license", server.uri()),
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

// The blocking client must be built, used and dropped off the async runtime.
async fn fetch(config: LicenseGuardConfig) -> Result<LicenseRecord, LicenseGuardError> {
    tokio::task::spawn_blocking(move || {
        let client = LicenseServerClient::new(&config)?;
        client.fetch(KEY)
    })
    .await
    .unwrap()
}

async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/license/{}", KEY)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

// ── Successful lookups ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn fetch_parses_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/license/{}", KEY)))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VALID_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let record = fetch(config_for(&server)).await.unwrap();
    assert_eq!(record.product_id, 5);
    assert_eq!(record.user_id, 9);
    assert_eq!(record.username, "kelvin");
    assert_eq!(record.license_key, KEY);
    assert!(record.sponsored);
    assert_eq!(record.expires_at.unwrap().to_string(), "2031-05-04 03:02:01");
}

#[tokio::test(flavor = "multi_thread")]
async fn success_false_is_lookup_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/license/{}", KEY)))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data": {"productId": 5, "userId": 9, "active": true, "permanent": true}, "success": false}"#,
        ))
        .mount(&server)
        .await;

    let err = fetch(config_for(&server)).await.unwrap_err();
    assert!(matches!(err, LicenseGuardError::LookupUnsuccessful));
    assert_eq!(err.kind(), FailureKind::Payload);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/license/{}", KEY)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = fetch(config_for(&server)).await.unwrap_err();
    assert!(matches!(err, LicenseGuardError::ProtocolError(_)));
}

// ── Status classification ───────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn status_404_is_not_found() {
    let server = MockServer::start().await;
    mount_status(&server, 404).await;

    let err = fetch(config_for(&server)).await.unwrap_err();
    assert!(matches!(err, LicenseGuardError::LicenseNotFound));
    assert_eq!(err.kind(), FailureKind::Protocol);
}

#[tokio::test(flavor = "multi_thread")]
async fn status_403_is_inactive() {
    let server = MockServer::start().await;
    mount_status(&server, 403).await;
    let err = fetch(config_for(&server)).await.unwrap_err();
    assert!(matches!(err, LicenseGuardError::LicenseInactive));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_401_is_blocked() {
    let server = MockServer::start().await;
    mount_status(&server, 401).await;
    let err = fetch(config_for(&server)).await.unwrap_err();
    assert!(matches!(err, LicenseGuardError::LicenseBlocked));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_406_is_expired() {
    let server = MockServer::start().await;
    mount_status(&server, 406).await;
    let err = fetch(config_for(&server)).await.unwrap_err();
    assert!(matches!(err, LicenseGuardError::LicenseExpired));
}

#[tokio::test(flavor = "multi_thread")]
async fn other_status_is_server_unavailable() {
    let server = MockServer::start().await;
    mount_status(&server, 500).await;
    let err = fetch(config_for(&server)).await.unwrap_err();
    assert!(matches!(
        err,
        LicenseGuardError::ServerUnavailable { status: 500 }
    ));
}

// ── Transport ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(VALID_BODY)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = LicenseGuardConfig {
        request_timeout: Duration::from_millis(200),
        ..config_for(&server)
    };
    let err = fetch(config).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_transport_error() {
    let config = LicenseGuardConfig {
        // Port 9 (discard) on loopback is almost never listening.
        server_url: "http://127.0.0.1:9/api/v1/license".to_string(),
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let err = fetch(config).await.unwrap_err();
    assert!(matches!(err, LicenseGuardError::Transport(_)));
}
