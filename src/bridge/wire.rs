//! The engine executable's wire schema.
//!
//! The executable emits camelCase JSON while the rest of the crate speaks
//! snake_case. The translation is kept as an explicit, field-by-field
//! mapping here so neither schema leaks across the bridge boundary.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    ActionResult, ActiveState, Observation, State, StateStructure, StateTransition,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureResponse {
    pub states: Vec<StateInfo>,
    #[serde(default)]
    pub current_state: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<TransitionInfo>,
    #[serde(default)]
    pub is_initial: bool,
    #[serde(default)]
    pub is_final: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionInfo {
    pub from_state: String,
    pub to_state: String,
    pub action: String,
    #[serde(default)]
    pub probability: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationResponse {
    pub timestamp: DateTime<Utc>,
    pub active_states: Vec<ActiveStateInfo>,
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub screen_width: u32,
    #[serde(default)]
    pub screen_height: u32,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveStateInfo {
    pub name: String,
    pub confidence: f64,
    #[serde(default)]
    pub matched_patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    pub action_type: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub result_state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Payload passed to the `execute-action` operation argument.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload<'a> {
    pub action_type: &'a str,
    pub parameters: &'a HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_state: Option<&'a str>,
    pub timeout: f64,
}

impl From<StructureResponse> for StateStructure {
    fn from(wire: StructureResponse) -> Self {
        StateStructure {
            states: wire.states.into_iter().map(State::from).collect(),
            current_state: wire.current_state,
            metadata: wire.metadata,
        }
    }
}

impl From<StateInfo> for State {
    fn from(wire: StateInfo) -> Self {
        State {
            name: wire.name,
            description: wire.description,
            images: wire.images,
            transitions: wire
                .transitions
                .into_iter()
                .map(StateTransition::from)
                .collect(),
            is_initial: wire.is_initial,
            is_final: wire.is_final,
        }
    }
}

impl From<TransitionInfo> for StateTransition {
    fn from(wire: TransitionInfo) -> Self {
        StateTransition {
            from_state: wire.from_state,
            to_state: wire.to_state,
            action: wire.action,
            probability: wire.probability,
        }
    }
}

impl From<ObservationResponse> for Observation {
    fn from(wire: ObservationResponse) -> Self {
        Observation {
            timestamp: wire.timestamp,
            active_states: wire.active_states.into_iter().map(ActiveState::from).collect(),
            screenshot: wire.screenshot,
            screen_width: wire.screen_width,
            screen_height: wire.screen_height,
            metadata: wire.metadata,
        }
    }
}

impl From<ActiveStateInfo> for ActiveState {
    fn from(wire: ActiveStateInfo) -> Self {
        ActiveState {
            name: wire.name,
            confidence: wire.confidence,
            matched_patterns: wire.matched_patterns,
        }
    }
}

impl From<ActionResponse> for ActionResult {
    fn from(wire: ActionResponse) -> Self {
        ActionResult {
            success: wire.success,
            action_type: wire.action_type,
            duration: wire.duration,
            result_state: wire.result_state,
            error: wire.error,
            metadata: wire.metadata,
        }
    }
}
