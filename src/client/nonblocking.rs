//! Asynchronous orchestrator.
//!
//! Same surface as [`blocking::Client`](super::blocking::Client); retry
//! delays suspend only the calling task, so concurrent callers sharing a
//! runtime are unaffected.

use std::time::Duration;

use log::debug;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use super::{
    ClientConfig, DragTarget, EXECUTE_PATH, HEALTH_PATH, OBSERVATION_PATH, STRUCTURE_PATH,
    check_status, click_request, decode_body, drag_request, endpoint, map_transport_error,
    type_request, wait_request,
};
use crate::error::Error;
use crate::models::{ActionRequest, ActionResult, HealthStatus, Location, Observation, StateStructure};
use crate::retry;

/// Async client for the serving layer.
///
/// Session lifecycle matches the blocking client: lazily acquired,
/// idempotently released by [`close`](AsyncClient::close).
pub struct AsyncClient {
    config: ClientConfig,
    session: Option<reqwest::Client>,
}

impl AsyncClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Release the HTTP session. Idempotent.
    pub fn close(&mut self) {
        self.session = None;
    }

    fn session(&mut self) -> Result<&reqwest::Client, Error> {
        let session = match self.session.take() {
            Some(session) => session,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| Error::ConnectionFailure(format!("failed to build client: {}", e)))?,
        };
        Ok(self.session.insert(session))
    }

    /// Fetch the application's state graph.
    pub async fn state_structure(&mut self) -> Result<StateStructure, Error> {
        let timeout = self.config.timeout;
        self.request(Method::GET, STRUCTURE_PATH, None, timeout).await
    }

    /// Fetch the engine's current observation.
    pub async fn observation(&mut self) -> Result<Observation, Error> {
        let timeout = self.config.timeout;
        self.request(Method::GET, OBSERVATION_PATH, None, timeout)
            .await
    }

    /// Execute one action. A failed action (well-formed reply with
    /// `success == false`) surfaces as [`Error::RemoteRejected`].
    pub async fn execute_action(&mut self, request: &ActionRequest) -> Result<ActionResult, Error> {
        let budget = request
            .timeout
            .filter(|t| *t > 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or(self.config.timeout);
        let body = serde_json::to_value(request)
            .map_err(|e| Error::ValidationFailure(format!("unserializable action request: {}", e)))?;

        let result: ActionResult = self
            .request(Method::POST, EXECUTE_PATH, Some(body), budget)
            .await?;
        if !result.success {
            return Err(Error::RemoteRejected(format!(
                "action '{}' failed: {}",
                result.action_type,
                result.error.as_deref().unwrap_or("no detail")
            )));
        }
        Ok(result)
    }

    /// Serving-layer liveness report.
    pub async fn health(&mut self) -> Result<HealthStatus, Error> {
        let timeout = self.config.timeout;
        self.request(Method::GET, HEALTH_PATH, None, timeout).await
    }

    // --- convenience actions, all layered on execute_action ---

    pub async fn click(
        &mut self,
        pattern: Option<&str>,
        location: Option<Location>,
        confidence: f64,
        timeout: Option<Duration>,
    ) -> Result<ActionResult, Error> {
        let mut request = click_request(pattern, location, confidence)?;
        request.timeout = timeout.map(|t| t.as_secs_f64());
        self.execute_action(&request).await
    }

    pub async fn type_text(
        &mut self,
        text: &str,
        typing_speed: Option<u32>,
        timeout: Option<Duration>,
    ) -> Result<ActionResult, Error> {
        let mut request = type_request(text, typing_speed);
        request.timeout = timeout.map(|t| t.as_secs_f64());
        self.execute_action(&request).await
    }

    pub async fn drag(
        &mut self,
        start: DragTarget,
        end: DragTarget,
        duration: f64,
        timeout: Option<Duration>,
    ) -> Result<ActionResult, Error> {
        let mut request = drag_request(start, end, duration);
        request.timeout = timeout.map(|t| t.as_secs_f64());
        self.execute_action(&request).await
    }

    pub async fn wait_for_state(
        &mut self,
        state_name: &str,
        timeout: Duration,
    ) -> Result<ActionResult, Error> {
        self.execute_action(&wait_request(state_name, timeout)).await
    }

    async fn request<T: DeserializeOwned>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        budget: Duration,
    ) -> Result<T, Error> {
        // reqwest clients are handles over a shared pool; cloning one out
        // keeps the retry closure free of borrows on `self`.
        let session = self.session()?.clone();
        let url = endpoint(&self.config.base_url, path);
        let policy = self.config.retry.clone();
        retry::run(&policy, || {
            let session = session.clone();
            let method = method.clone();
            let url = url.clone();
            let body = body.clone();
            async move { Self::request_once(session, method, url, body, budget).await }
        })
        .await
    }

    async fn request_once<T: DeserializeOwned>(
        session: reqwest::Client,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
        budget: Duration,
    ) -> Result<T, Error> {
        debug!("{} {}", method, url);
        let mut req = session
            .request(method, &url)
            .timeout(budget)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(body) = &body {
            req = req.json(body);
        }
        let response = req.send().await.map_err(|e| map_transport_error(e, budget))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, budget))?;
        check_status(status, &text)?;
        decode_body(&text)
    }
}
