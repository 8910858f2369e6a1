//! Marionette drives a remote GUI-automation engine.
//!
//! The engine itself is an external, independently-versioned executable.
//! Server-side, [`bridge::CommandBridge`] invokes it per call and turns exit
//! statuses into typed results or typed errors. Client-side,
//! [`client::blocking::Client`] and [`client::nonblocking::AsyncClient`] talk
//! to the serving layer over HTTP. Both transports share one error taxonomy
//! ([`error::Error`]) and one retry discipline ([`retry::RetryPolicy`]).

pub mod bridge;
pub mod client;
pub mod engine;
pub mod error;
pub mod invoker;
pub mod models;
pub mod retry;
