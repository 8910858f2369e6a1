//! Backend seam for the serving layer.
//!
//! The serving layer talks to [`Engine`] and nothing else. Pick a variant
//! once at startup: [`cli::CliEngine`] when an engine executable is
//! configured, [`fixture::FixtureEngine`] otherwise. There is no per-call
//! "is the CLI configured" branch.

pub mod cli;
pub mod fixture;

use async_trait::async_trait;

use crate::error::Error;
use crate::models::{ActionRequest, ActionResult, Observation, StateStructure};

/// What the automation engine can do, regardless of backing.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn state_structure(&self) -> Result<StateStructure, Error>;
    async fn observation(&self) -> Result<Observation, Error>;
    async fn execute(&self, request: &ActionRequest) -> Result<ActionResult, Error>;
    /// Liveness. Never raises; any failure reads as `false`.
    async fn is_available(&self) -> bool;
}
