//! Engine backed by the real executable through the command bridge.

use async_trait::async_trait;

use super::Engine;
use crate::bridge::CommandBridge;
use crate::error::Error;
use crate::models::{ActionRequest, ActionResult, Observation, StateStructure};

/// Forwards every operation to a validated [`CommandBridge`].
pub struct CliEngine {
    bridge: CommandBridge,
}

impl CliEngine {
    pub fn new(bridge: CommandBridge) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Engine for CliEngine {
    async fn state_structure(&self) -> Result<StateStructure, Error> {
        self.bridge.fetch_structure().await
    }

    async fn observation(&self) -> Result<Observation, Error> {
        self.bridge.fetch_observation().await
    }

    async fn execute(&self, request: &ActionRequest) -> Result<ActionResult, Error> {
        self.bridge.execute_action(request, None).await
    }

    async fn is_available(&self) -> bool {
        self.bridge.is_available().await
    }
}
