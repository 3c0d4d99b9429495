//! Error types for the PDD DNS system
//!
//! This module defines the error types shared by the engine, the registrar
//! clients and the CLI. Probe-level failures have their own type
//! ([`ProbeError`]) because they never leave a probe.

use thiserror::Error;

/// Result type alias for PDD DNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the PDD DNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (detected at construction time)
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors (from registrar APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Registrar rejected the request
    #[error("Registrar error ({registrar}): {message}")]
    Registrar {
        /// Registrar name
        registrar: String,
        /// Error message reported by the registrar
        message: String,
    },

    /// The overall deadline expired before the operation finished
    #[error("Timeout")]
    Timeout,
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a registrar-specific error
    pub fn registrar(registrar: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registrar {
            registrar: registrar.into(),
            message: message.into(),
        }
    }
}

/// Phase of a DNS exchange, used to tell timeouts apart in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    /// Resolving the server address and connecting
    Dial,
    /// Sending the query
    Write,
    /// Waiting for the response
    Read,
}

impl std::fmt::Display for ExchangePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = match self {
            ExchangePhase::Dial => "dial",
            ExchangePhase::Write => "write",
            ExchangePhase::Read => "read",
        };
        f.write_str(phase)
    }
}

/// Failure of a single DNS probe
///
/// Every variant is a soft failure: the probe logs it and reports
/// `matched = false`. It is never returned to engine callers.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The server address could not be resolved
    #[error("cannot resolve server address '{server}': {reason}")]
    Resolve { server: String, reason: String },

    /// Connecting (or binding) failed
    #[error("dial failed: {0}")]
    Dial(#[source] std::io::Error),

    /// Sending the query failed
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    /// Receiving the response failed
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    /// One of the per-query timeouts elapsed
    #[error("{phase} timeout")]
    Timeout { phase: ExchangePhase },

    /// Response id does not match the query id
    #[error("bad answer id: sent {sent}, received {received}")]
    IdMismatch { sent: u16, received: u16 },

    /// The query could not be encoded
    #[error("cannot encode query: {0}")]
    Encode(String),

    /// The response could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),

    /// The record type token names no known DNS type
    #[error("unknown record type: {0}")]
    UnsupportedType(String),

    /// The record name is not a valid DNS name
    #[error("invalid record name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}
