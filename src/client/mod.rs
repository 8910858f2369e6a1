//! HTTP orchestrators for the serving layer.
//!
//! [`blocking::Client`] and [`nonblocking::AsyncClient`] expose the same
//! surface: the three engine operations plus a health probe, every request
//! wrapped in the retry engine, every transport failure mapped onto
//! [`Error`]. The convenience actions (click, type, drag, wait) are pure
//! request builders over one generic execute call and live here so both
//! clients share them.

pub mod blocking;
pub mod nonblocking;

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::models::{ActionRequest, Location};
use crate::retry::RetryPolicy;

const API_BASE: &str = "/api/v1";

pub(crate) const STRUCTURE_PATH: &str = "/state_structure";
pub(crate) const OBSERVATION_PATH: &str = "/observation";
pub(crate) const EXECUTE_PATH: &str = "/execute";
pub(crate) const HEALTH_PATH: &str = "/health";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared construction parameters for both client flavors.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Default per-request timeout.
    pub timeout: Duration,
    /// Applied to every request made through the client.
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Where a drag starts or ends: an image pattern or a fixed point.
#[derive(Debug, Clone)]
pub enum DragTarget {
    Pattern(String),
    Point(Location),
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}{}", base_url.trim_end_matches('/'), API_BASE, path)
}

/// Map a transport-level failure onto the taxonomy. `budget` is the
/// deadline the request ran under, reported on timeout.
pub(crate) fn map_transport_error(err: reqwest::Error, budget: Duration) -> Error {
    if err.is_timeout() {
        Error::TimedOut {
            seconds: budget.as_secs_f64(),
        }
    } else if err.is_connect() {
        Error::ConnectionFailure(err.to_string())
    } else if err.is_decode() {
        Error::MalformedResponse {
            detail: err.to_string(),
            raw: String::new(),
        }
    } else {
        Error::ConnectionFailure(err.to_string())
    }
}

/// Translate a non-success HTTP status. 4xx is request-shape rejection,
/// everything else is the server refusing the operation.
pub(crate) fn check_status(status: StatusCode, body: &str) -> Result<(), Error> {
    if status.is_success() {
        return Ok(());
    }
    let detail = error_detail(status, body);
    if status.is_client_error() {
        Err(Error::ValidationFailure(detail))
    } else {
        Err(Error::RemoteRejected(detail))
    }
}

/// Prefer the server's own `detail` field, fall back to the raw body, then
/// to the bare status line.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(detail) = value.get("detail")
    {
        let detail = detail
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| detail.to_string());
        return format!("{}: {}", status, detail);
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, trimmed)
    }
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
        detail: e.to_string(),
        raw: body.to_string(),
    })
}

// --- action request builders ---

/// Click on an image pattern or a fixed location — exactly one of the two.
pub fn click_request(
    pattern: Option<&str>,
    location: Option<Location>,
    confidence: f64,
) -> Result<ActionRequest, Error> {
    let mut request = ActionRequest::new("click");
    match (pattern, location) {
        (Some(pattern), None) => {
            request
                .parameters
                .insert("image_pattern".into(), serde_json::json!(pattern));
            request
                .parameters
                .insert("confidence".into(), serde_json::json!(confidence));
        }
        (None, Some(location)) => {
            request
                .parameters
                .insert("location".into(), serde_json::json!(location));
        }
        (None, None) => {
            return Err(Error::ValidationFailure(
                "either an image pattern or a location must be provided".into(),
            ));
        }
        (Some(_), Some(_)) => {
            return Err(Error::ValidationFailure(
                "provide an image pattern or a location, not both".into(),
            ));
        }
    }
    Ok(request)
}

/// Type text at the current cursor location.
pub fn type_request(text: &str, typing_speed: Option<u32>) -> ActionRequest {
    let mut request = ActionRequest::new("type");
    request
        .parameters
        .insert("text".into(), serde_json::json!(text));
    if let Some(speed) = typing_speed {
        request
            .parameters
            .insert("typing_speed".into(), serde_json::json!(speed));
    }
    request
}

/// Drag between two targets over `duration` seconds.
pub fn drag_request(start: DragTarget, end: DragTarget, duration: f64) -> ActionRequest {
    let mut request = ActionRequest::new("drag");
    request
        .parameters
        .insert("duration".into(), serde_json::json!(duration));
    match start {
        DragTarget::Point(point) => {
            request
                .parameters
                .insert("start_x".into(), serde_json::json!(point.x));
            request
                .parameters
                .insert("start_y".into(), serde_json::json!(point.y));
        }
        DragTarget::Pattern(pattern) => {
            request
                .parameters
                .insert("start_pattern".into(), serde_json::json!(pattern));
        }
    }
    match end {
        DragTarget::Point(point) => {
            request
                .parameters
                .insert("end_x".into(), serde_json::json!(point.x));
            request
                .parameters
                .insert("end_y".into(), serde_json::json!(point.y));
        }
        DragTarget::Pattern(pattern) => {
            request
                .parameters
                .insert("end_pattern".into(), serde_json::json!(pattern));
        }
    }
    request
}

/// Wait until `state_name` becomes active, polling once a second.
pub fn wait_request(state_name: &str, timeout: Duration) -> ActionRequest {
    let mut request = ActionRequest::new("wait");
    request
        .parameters
        .insert("state_name".into(), serde_json::json!(state_name));
    request
        .parameters
        .insert("check_interval".into(), serde_json::json!(1.0));
    request.target_state = Some(state_name.to_string());
    request.timeout = Some(timeout.as_secs_f64());
    request
}
