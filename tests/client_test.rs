use std::time::{Duration, Instant};

use marionette::client::blocking::Client;
use marionette::client::{ClientConfig, DragTarget};
use marionette::error::Error;
use marionette::models::Location;
use marionette::retry::RetryPolicy;

fn no_retry_config(url: &str) -> ClientConfig {
    ClientConfig::new(url)
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryPolicy::none())
}

const STRUCTURE_BODY: &str = r#"{
    "states": [{"name": "main_menu", "is_initial": true,
                "transitions": [{"from_state": "main_menu", "to_state": "settings",
                                 "action": "click_settings", "probability": 0.95}]}],
    "current_state": "main_menu"
}"#;

#[test]
fn state_structure_decodes() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v1/state_structure")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(STRUCTURE_BODY)
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    let structure = client.state_structure().unwrap();
    mock.assert();
    assert_eq!(structure.current_state.as_deref(), Some("main_menu"));
    assert_eq!(structure.states[0].transitions[0].to_state, "settings");
}

#[test]
fn observation_decodes() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v1/observation")
        .with_status(200)
        .with_body(
            r#"{"timestamp": "2024-05-01T12:30:00Z",
                "active_states": [{"name": "main_menu", "confidence": 0.95}],
                "screen_width": 1920, "screen_height": 1080}"#,
        )
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    let obs = client.observation().unwrap();
    mock.assert();
    assert_eq!(obs.active_states[0].name, "main_menu");
    assert_eq!(obs.screen_height, 1080);
}

#[test]
fn execute_action_posts_snake_case_request() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v1/execute")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "action_type": "click",
            "parameters": {"image_pattern": "button.png"}
        })))
        .with_status(200)
        .with_body(
            r#"{"success": true, "action_type": "click", "duration": 0.5,
                "result_state": "settings"}"#,
        )
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    let result = client.click(Some("button.png"), None, 0.9, None).unwrap();
    mock.assert();
    assert!(result.success);
    assert_eq!(result.result_state.as_deref(), Some("settings"));
}

#[test]
fn failed_action_is_remote_rejected() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/api/v1/execute")
        .with_status(200)
        .with_body(
            r#"{"success": false, "action_type": "click", "duration": 0.1,
                "error": "pattern not found on screen"}"#,
        )
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    let err = client.click(Some("missing.png"), None, 0.9, None).unwrap_err();
    match err {
        Error::RemoteRejected(msg) => assert!(msg.contains("pattern not found")),
        other => panic!("expected RemoteRejected, got {:?}", other),
    }
}

#[test]
fn http_422_is_validation_failure_and_not_retried() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v1/execute")
        .with_status(422)
        .with_body(r#"{"detail": "action_type is required"}"#)
        .expect(1)
        .create();

    let config = ClientConfig::new(server.url()).with_retry(RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_millis(1),
        jitter: false,
        ..RetryPolicy::default()
    });
    let mut client = Client::new(config);
    let err = client.type_text("hello", None, None).unwrap_err();
    mock.assert();
    match err {
        Error::ValidationFailure(msg) => assert!(msg.contains("action_type is required")),
        other => panic!("expected ValidationFailure, got {:?}", other),
    }
}

#[test]
fn http_500_is_remote_rejected() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v1/health")
        .with_status(500)
        .with_body("engine exploded")
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    let err = client.health().unwrap_err();
    assert!(matches!(err, Error::RemoteRejected(_)));
}

#[test]
fn malformed_success_body_is_malformed_response() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v1/state_structure")
        .with_status(200)
        .with_body("<html>login required</html>")
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    let err = client.state_structure().unwrap_err();
    match err {
        Error::MalformedResponse { raw, .. } => assert!(raw.contains("login required")),
        other => panic!("expected MalformedResponse, got {:?}", other),
    }
}

#[test]
fn connection_failure_is_retried_then_raised() {
    // Nothing listens on this port; each attempt fails at connect time.
    let config = ClientConfig::new("http://127.0.0.1:9").with_retry(RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(50),
        max_delay: Duration::from_millis(50),
        jitter: false,
        ..RetryPolicy::default()
    });
    let mut client = Client::new(config);

    let start = Instant::now();
    let err = client.observation().unwrap_err();
    assert!(matches!(err, Error::ConnectionFailure(_)));
    // One inter-attempt delay proves the second attempt happened.
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[test]
fn invalid_click_fails_fast_without_a_request() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v1/execute")
        .expect(0)
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    let err = client.click(None, None, 0.9, None).unwrap_err();
    assert!(matches!(err, Error::ValidationFailure(_)));

    let err = client
        .click(Some("a.png"), Some(Location { x: 1, y: 2 }), 0.9, None)
        .unwrap_err();
    assert!(matches!(err, Error::ValidationFailure(_)));
    mock.assert();
}

#[test]
fn drag_builds_mixed_parameters() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v1/execute")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "action_type": "drag",
            "parameters": {"start_pattern": "file.png", "end_x": 500, "end_y": 500}
        })))
        .with_status(200)
        .with_body(r#"{"success": true, "action_type": "drag", "duration": 0.8}"#)
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    client
        .drag(
            DragTarget::Pattern("file.png".into()),
            DragTarget::Point(Location { x: 500, y: 500 }),
            1.0,
            None,
        )
        .unwrap();
    mock.assert();
}

#[test]
fn wait_for_state_targets_state() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v1/execute")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "action_type": "wait",
            "target_state": "dashboard",
            "timeout": 20.0
        })))
        .with_status(200)
        .with_body(
            r#"{"success": true, "action_type": "wait", "duration": 2.0,
                "result_state": "dashboard"}"#,
        )
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    let result = client
        .wait_for_state("dashboard", Duration::from_secs(20))
        .unwrap();
    mock.assert();
    assert_eq!(result.result_state.as_deref(), Some("dashboard"));
}

#[test]
fn health_decodes() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v1/health")
        .with_status(200)
        .with_body(
            r#"{"status": "ok", "version": "0.3.0", "engine_connected": true,
                "timestamp": "2024-05-01T12:30:00Z"}"#,
        )
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    let health = client.health().unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.engine_connected);
}

#[test]
fn close_is_idempotent_and_session_reacquires() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v1/health")
        .with_status(200)
        .with_body(
            r#"{"status": "ok", "version": "0.3.0",
                "timestamp": "2024-05-01T12:30:00Z"}"#,
        )
        .expect(2)
        .create();

    let mut client = Client::new(no_retry_config(&server.url()));
    // Close before any acquisition: no-op.
    client.close();
    client.close();

    client.health().unwrap();
    client.close();
    // The session comes back lazily after a close.
    client.health().unwrap();
}
