//! Typed documents exchanged with the automation engine.
//!
//! These are the internal, snake_case representations. The engine
//! executable's own camelCase wire schema lives in [`crate::bridge::wire`]
//! and is mapped into these types at the bridge boundary.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A transition between two states in the application's state graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from_state: String,
    pub to_state: String,
    /// Action that triggers this transition.
    pub action: String,
    #[serde(default)]
    pub probability: f64,
}

/// One state in the application's state graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Image patterns that identify this state on screen.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<StateTransition>,
    #[serde(default)]
    pub is_initial: bool,
    #[serde(default)]
    pub is_final: bool,
}

/// The complete state graph of the application under automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateStructure {
    pub states: Vec<State>,
    #[serde(default)]
    pub current_state: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A state the engine currently believes is active, with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveState {
    pub name: String,
    pub confidence: f64,
    #[serde(default)]
    pub matched_patterns: Vec<String>,
}

/// What the engine sees right now: active states, a screenshot, and the
/// screen geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub active_states: Vec<ActiveState>,
    /// Base64-encoded screenshot, when capture is enabled.
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub screen_width: u32,
    #[serde(default)]
    pub screen_height: u32,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A point on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

/// A rectangular screen region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A request for the engine to perform one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Action kind: `click`, `type`, `drag`, `wait`, ...
    pub action_type: String,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    /// State the caller expects to land in afterwards.
    #[serde(default)]
    pub target_state: Option<String>,
    /// Per-action timeout in seconds. Falls back to the caller's default.
    #[serde(default)]
    pub timeout: Option<f64>,
}

impl ActionRequest {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            parameters: HashMap::new(),
            target_state: None,
            timeout: None,
        }
    }
}

/// What the engine reports after performing (or failing) an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub action_type: String,
    /// Execution duration in seconds.
    pub duration: f64,
    #[serde(default)]
    pub result_state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Serving-layer liveness report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    #[serde(default)]
    pub engine_connected: bool,
    pub timestamp: DateTime<Utc>,
}
