//! One error taxonomy for both transports.
//!
//! The process bridge and the HTTP clients fail in the same five ways, so
//! upstream code matches on a single [`Error`] regardless of whether the
//! remote peer was the engine executable or the serving layer.

use thiserror::Error;

/// Everything that can go wrong talking to the automation engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The peer process could not be started, or crashed before producing
    /// an exit status, or the server was unreachable at the network level.
    #[error("invocation failed: {0}")]
    InvocationFailed(String),

    /// The call exceeded its allotted time. Carries the budget that was
    /// exceeded, in seconds.
    #[error("timed out after {seconds}s")]
    TimedOut { seconds: f64 },

    /// The peer answered, but the payload was not the expected structured
    /// document. Carries the raw text for diagnosis.
    #[error("malformed response ({detail}): {raw}")]
    MalformedResponse { detail: String, raw: String },

    /// The peer explicitly reported failure: non-zero exit, or an
    /// application-level error in an otherwise well-formed reply.
    #[error("remote rejected: {0}")]
    RemoteRejected(String),

    /// The server could not be reached.
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// The caller-supplied request was malformed. Fails fast; the peer is
    /// never contacted.
    #[error("validation failure: {0}")]
    ValidationFailure(String),
}

impl Error {
    /// Default retry classification: only connectivity and timeout failures
    /// can change outcome on a re-attempt. Retrying a malformed or rejected
    /// request cannot.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::InvocationFailed(_) | Error::TimedOut { .. } | Error::ConnectionFailure(_)
        )
    }
}
