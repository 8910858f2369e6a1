//! Canned-data engine for development and tests.
//!
//! Serves a small but realistic application: a main menu, a login screen,
//! a dashboard, and a settings page. Useful when no engine executable is
//! present — same trait, zero processes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;

use super::Engine;
use crate::error::Error;
use crate::models::{
    ActionRequest, ActionResult, ActiveState, Observation, State, StateStructure, StateTransition,
};

/// 1x1 transparent PNG, base64-encoded. Stands in for a real screenshot.
const FIXTURE_SCREENSHOT: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Engine that answers from fixtures instead of a live process.
pub struct FixtureEngine;

fn transition(from: &str, to: &str, action: &str) -> StateTransition {
    StateTransition {
        from_state: from.to_string(),
        to_state: to.to_string(),
        action: action.to_string(),
        probability: 0.95,
    }
}

fn meta(entries: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[async_trait]
impl Engine for FixtureEngine {
    async fn state_structure(&self) -> Result<StateStructure, Error> {
        Ok(StateStructure {
            states: vec![
                State {
                    name: "main_menu".into(),
                    description: "Application main menu".into(),
                    images: vec!["main_menu_logo.png".into(), "main_menu_title.png".into()],
                    transitions: vec![
                        transition("main_menu", "login_screen", "click_login"),
                        transition("main_menu", "settings", "click_settings"),
                    ],
                    is_initial: true,
                    is_final: false,
                },
                State {
                    name: "login_screen".into(),
                    description: "User login screen".into(),
                    images: vec![
                        "login_form.png".into(),
                        "username_field.png".into(),
                        "password_field.png".into(),
                    ],
                    transitions: vec![
                        transition("login_screen", "dashboard", "submit_login"),
                        transition("login_screen", "main_menu", "click_back"),
                    ],
                    is_initial: false,
                    is_final: false,
                },
                State {
                    name: "dashboard".into(),
                    description: "User dashboard".into(),
                    images: vec!["dashboard_header.png".into(), "user_profile.png".into()],
                    transitions: vec![transition("dashboard", "main_menu", "logout")],
                    is_initial: false,
                    is_final: false,
                },
                State {
                    name: "settings".into(),
                    description: "Application settings".into(),
                    images: vec!["settings_header.png".into(), "settings_menu.png".into()],
                    transitions: vec![transition("settings", "main_menu", "click_back")],
                    is_initial: false,
                    is_final: false,
                },
            ],
            current_state: Some("main_menu".into()),
            metadata: meta(&[
                ("application", serde_json::json!("Sample Application")),
                ("version", serde_json::json!("1.0.0")),
            ]),
        })
    }

    async fn observation(&self) -> Result<Observation, Error> {
        Ok(Observation {
            timestamp: Utc::now(),
            active_states: vec![
                ActiveState {
                    name: "main_menu".into(),
                    confidence: 0.95,
                    matched_patterns: vec![
                        "main_menu_logo.png".into(),
                        "main_menu_title.png".into(),
                    ],
                },
                ActiveState {
                    name: "login_screen".into(),
                    confidence: 0.15,
                    matched_patterns: vec![],
                },
            ],
            screenshot: Some(FIXTURE_SCREENSHOT.into()),
            screen_width: 1920,
            screen_height: 1080,
            metadata: meta(&[
                ("capture_duration", serde_json::json!(0.125)),
                ("analysis_duration", serde_json::json!(0.087)),
                ("total_patterns_checked", serde_json::json!(12)),
            ]),
        })
    }

    async fn execute(&self, request: &ActionRequest) -> Result<ActionResult, Error> {
        let result = match request.action_type.as_str() {
            "click" => ActionResult {
                success: true,
                action_type: request.action_type.clone(),
                duration: 0.523,
                result_state: request
                    .target_state
                    .clone()
                    .or_else(|| Some("unknown".into())),
                error: None,
                metadata: meta(&[
                    ("click_location", serde_json::json!({"x": 640, "y": 480})),
                    ("pattern_found", serde_json::json!(true)),
                    ("confidence", serde_json::json!(0.92)),
                ]),
            },
            "type" => ActionResult {
                success: true,
                action_type: request.action_type.clone(),
                duration: 1.234,
                result_state: request.target_state.clone(),
                error: None,
                metadata: meta(&[(
                    "text_entered",
                    request
                        .parameters
                        .get("text")
                        .cloned()
                        .unwrap_or(serde_json::json!("")),
                )]),
            },
            "drag" => ActionResult {
                success: true,
                action_type: request.action_type.clone(),
                duration: 0.876,
                result_state: request.target_state.clone(),
                error: None,
                metadata: meta(&[
                    ("start_location", serde_json::json!({"x": 100, "y": 100})),
                    ("end_location", serde_json::json!({"x": 500, "y": 500})),
                ]),
            },
            "wait" => ActionResult {
                success: true,
                action_type: request.action_type.clone(),
                duration: 1.0,
                result_state: request.target_state.clone(),
                error: None,
                metadata: HashMap::new(),
            },
            other => ActionResult {
                success: false,
                action_type: request.action_type.clone(),
                duration: 0.001,
                result_state: None,
                error: Some(format!("unknown action type: {}", other)),
                metadata: HashMap::new(),
            },
        };
        Ok(result)
    }

    async fn is_available(&self) -> bool {
        true
    }
}
