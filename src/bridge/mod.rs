//! Typed façade over the engine executable.
//!
//! A [`CommandBridge`] binds exactly one executable and turns the three
//! logical operations — fetch structure, fetch observation, execute action —
//! into bounded process invocations. Calls are stateless and independent;
//! concurrent callers each get their own invocation.

pub mod wire;

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::invoker::{self, CommandResult};
use crate::models::{ActionRequest, ActionResult, Observation, StateStructure};
use self::wire::{ActionPayload, ActionResponse, ObservationResponse, StructureResponse};

const GET_STATE_STRUCTURE: &str = "get-state-structure";
const GET_OBSERVATION: &str = "get-observation";
const EXECUTE_ACTION: &str = "execute-action";

const VERSION_ARG: &str = "--version";
const HELP_ARG: &str = "--help";

/// Probe deadline, independent of the configured default timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_LAUNCHER: &str = "java";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable binding to one engine executable.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub executable: PathBuf,
    /// Interpreter that launches the executable (`java`, `sh`, ...).
    pub launcher: String,
    pub default_timeout: Duration,
}

impl BridgeConfig {
    /// Bind to an executable. Fails immediately if the path does not exist.
    pub fn new(executable: impl Into<PathBuf>) -> Result<Self, Error> {
        let executable = executable.into();
        if !executable.exists() {
            return Err(Error::InvocationFailed(format!(
                "engine executable not found at {}",
                executable.display()
            )));
        }
        Ok(Self {
            executable,
            launcher: DEFAULT_LAUNCHER.to_string(),
            default_timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_launcher(mut self, launcher: impl Into<String>) -> Self {
        self.launcher = launcher.into();
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}

/// The bridge. Construction probes the executable once; a bridge you hold
/// has already been validated.
#[derive(Debug)]
pub struct CommandBridge {
    config: BridgeConfig,
}

impl CommandBridge {
    /// Validate the executable with a version probe under [`PROBE_TIMEOUT`]
    /// and return a ready bridge. Construction does not retry.
    pub async fn connect(config: BridgeConfig) -> Result<Self, Error> {
        let bridge = Self { config };
        let result = bridge.invoke(&[VERSION_ARG], PROBE_TIMEOUT).await?;
        if !result.succeeded {
            return Err(Error::RemoteRejected(format!(
                "version probe failed: {}",
                result.error.unwrap_or_default()
            )));
        }
        info!("engine validated: {}", result.output.trim());
        Ok(bridge)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Fetch the application's state graph.
    pub async fn fetch_structure(&self) -> Result<StateStructure, Error> {
        let result = self
            .invoke(&[GET_STATE_STRUCTURE], self.config.default_timeout)
            .await?;
        let wire: StructureResponse = Self::decode(GET_STATE_STRUCTURE, result)?;
        Ok(wire.into())
    }

    /// Fetch what the engine currently observes on screen.
    pub async fn fetch_observation(&self) -> Result<Observation, Error> {
        let result = self
            .invoke(&[GET_OBSERVATION], self.config.default_timeout)
            .await?;
        let wire: ObservationResponse = Self::decode(GET_OBSERVATION, result)?;
        Ok(wire.into())
    }

    /// Execute one action. The effective deadline is, in order:
    /// a positive `timeout_override`, a positive `request.timeout`, the
    /// configured default — and it propagates end-to-end to the process.
    pub async fn execute_action(
        &self,
        request: &ActionRequest,
        timeout_override: Option<Duration>,
    ) -> Result<ActionResult, Error> {
        let deadline = timeout_override
            .filter(|t| *t > Duration::ZERO)
            .or_else(|| {
                request
                    .timeout
                    .filter(|t| *t > 0.0)
                    .map(Duration::from_secs_f64)
            })
            .unwrap_or(self.config.default_timeout);

        let payload = ActionPayload {
            action_type: &request.action_type,
            parameters: &request.parameters,
            target_state: request.target_state.as_deref(),
            timeout: deadline.as_secs_f64(),
        };
        let payload = serde_json::to_string(&payload)
            .map_err(|e| Error::ValidationFailure(format!("unserializable action request: {}", e)))?;

        let result = self.invoke(&[EXECUTE_ACTION, &payload], deadline).await?;
        let wire: ActionResponse = Self::decode(EXECUTE_ACTION, result)?;
        Ok(wire.into())
    }

    /// Liveness probe. The one operation that never raises: any failure,
    /// including a missing or hung executable, reads as `false`.
    pub async fn is_available(&self) -> bool {
        match self.invoke(&[HELP_ARG], PROBE_TIMEOUT).await {
            Ok(result) => result.succeeded,
            Err(_) => false,
        }
    }

    async fn invoke(&self, args: &[&str], deadline: Duration) -> Result<CommandResult, Error> {
        let mut argv = Vec::with_capacity(args.len() + 2);
        argv.push(self.config.launcher.clone());
        argv.push(self.config.executable.display().to_string());
        argv.extend(args.iter().map(|s| s.to_string()));
        debug!("engine call: {}", args[0]);
        invoker::run(&argv, deadline).await
    }

    /// Translate one completed invocation into a typed document. Non-zero
    /// exit surfaces the engine's own diagnostic; exit 0 with unparseable
    /// stdout surfaces the raw text, never a partial document.
    fn decode<T: DeserializeOwned>(operation: &str, result: CommandResult) -> Result<T, Error> {
        if !result.succeeded {
            return Err(Error::RemoteRejected(format!(
                "{}: {}",
                operation,
                result.error.unwrap_or_default()
            )));
        }
        serde_json::from_str(&result.output).map_err(|e| Error::MalformedResponse {
            detail: format!("{}: {}", operation, e),
            raw: result.output,
        })
    }
}
