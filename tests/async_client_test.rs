use std::time::{Duration, Instant};

use marionette::client::ClientConfig;
use marionette::client::nonblocking::AsyncClient;
use marionette::error::Error;
use marionette::retry::RetryPolicy;

fn no_retry_config(url: &str) -> ClientConfig {
    ClientConfig::new(url)
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryPolicy::none())
}

#[tokio::test]
async fn state_structure_decodes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/state_structure")
        .with_status(200)
        .with_body(
            r#"{"states": [{"name": "main_menu", "is_initial": true}],
                "current_state": "main_menu"}"#,
        )
        .create_async()
        .await;

    let mut client = AsyncClient::new(no_retry_config(&server.url()));
    let structure = client.state_structure().await.unwrap();
    mock.assert_async().await;
    assert_eq!(structure.current_state.as_deref(), Some("main_menu"));
}

#[tokio::test]
async fn execute_action_posts_and_decodes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/execute")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "action_type": "type",
            "parameters": {"text": "hello", "typing_speed": 50}
        })))
        .with_status(200)
        .with_body(r#"{"success": true, "action_type": "type", "duration": 1.2}"#)
        .create_async()
        .await;

    let mut client = AsyncClient::new(no_retry_config(&server.url()));
    let result = client.type_text("hello", Some(50), None).await.unwrap();
    mock.assert_async().await;
    assert!(result.success);
}

#[tokio::test]
async fn failed_action_is_remote_rejected() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/execute")
        .with_status(200)
        .with_body(
            r#"{"success": false, "action_type": "wait", "duration": 30.0,
                "error": "state never became active"}"#,
        )
        .create_async()
        .await;

    let mut client = AsyncClient::new(no_retry_config(&server.url()));
    let err = client
        .wait_for_state("dashboard", Duration::from_secs(30))
        .await
        .unwrap_err();
    match err {
        Error::RemoteRejected(msg) => assert!(msg.contains("never became active")),
        other => panic!("expected RemoteRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn http_4xx_is_validation_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/observation")
        .with_status(400)
        .with_body(r#"{"detail": "bad request"}"#)
        .create_async()
        .await;

    let mut client = AsyncClient::new(no_retry_config(&server.url()));
    let err = client.observation().await.unwrap_err();
    assert!(matches!(err, Error::ValidationFailure(_)));
}

#[tokio::test]
async fn malformed_body_is_malformed_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/health")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let mut client = AsyncClient::new(no_retry_config(&server.url()));
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn connection_failure_is_retried_then_raised() {
    let config = ClientConfig::new("http://127.0.0.1:9").with_retry(RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(50),
        max_delay: Duration::from_millis(50),
        jitter: false,
        ..RetryPolicy::default()
    });
    let mut client = AsyncClient::new(config);

    let start = Instant::now();
    let err = client.state_structure().await.unwrap_err();
    assert!(matches!(err, Error::ConnectionFailure(_)));
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn invalid_click_fails_fast() {
    let mut client = AsyncClient::new(no_retry_config("http://127.0.0.1:9"));
    let err = client.click(None, None, 0.9, None).await.unwrap_err();
    // Fails before any connection is attempted.
    assert!(matches!(err, Error::ValidationFailure(_)));
}

#[tokio::test]
async fn close_is_idempotent() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/health")
        .with_status(200)
        .with_body(
            r#"{"status": "ok", "version": "0.3.0",
                "timestamp": "2024-05-01T12:30:00Z"}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let mut client = AsyncClient::new(no_retry_config(&server.url()));
    client.close();
    client.close();
    client.health().await.unwrap();
    client.close();
    client.health().await.unwrap();
}
