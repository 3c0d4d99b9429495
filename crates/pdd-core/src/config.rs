//! Configuration types for propagation verification
//!
//! All values are supplied by the caller; nothing here reads files or the
//! environment. Durations are stored as integers so the structure can be
//! deserialized from plain JSON.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Transport used to talk to the authoritative servers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// DNS over TCP (length-prefixed messages)
    #[default]
    Tcp,
    /// DNS over UDP (one datagram each way)
    Udp,
}

impl FromStr for Transport {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Transport::Tcp),
            "udp" => Ok(Transport::Udp),
            other => Err(crate::Error::config(format!(
                "Unsupported DNS transport '{}'. Supported: tcp, udp",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Tcp => f.write_str("tcp"),
            Transport::Udp => f.write_str("udp"),
        }
    }
}

/// One authoritative server to verify against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerEndpoint {
    /// Server address as `host:port`
    pub address: String,
    /// Transport to use for this server
    pub transport: Transport,
}

impl ServerEndpoint {
    /// Create a new endpoint
    pub fn new(address: impl Into<String>, transport: Transport) -> Self {
        Self {
            address: address.into(),
            transport,
        }
    }
}

impl std::fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address, self.transport)
    }
}

/// Per-query I/O timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    /// Address resolution plus connect
    pub dial: Duration,
    /// Waiting for the response
    pub read: Duration,
    /// Sending the query
    pub write: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            dial: Duration::from_millis(default_timeout_ms()),
            read: Duration::from_millis(default_timeout_ms()),
            write: Duration::from_millis(default_timeout_ms()),
        }
    }
}

/// Propagation verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Authoritative servers (`host:port`), fixed for the lifetime of the engine
    #[serde(default)]
    pub servers: Vec<String>,

    /// Transport used for every server
    #[serde(default)]
    pub transport: Transport,

    /// How many consecutive successful rounds make a check pass
    #[serde(default = "default_attempts_per_check")]
    pub attempts_per_check: usize,

    /// Pause between failed checks (in milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Connect timeout per query (in milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub dial_timeout_ms: u64,

    /// Read timeout per query (in milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Write timeout per query (in milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub write_timeout_ms: u64,

    /// Overall deadline for [`verify`](crate::PropagationEngine::verify) (in milliseconds)
    ///
    /// `None` waits forever.
    #[serde(default)]
    pub overall_deadline_ms: Option<u64>,
}

impl VerificationConfig {
    /// Create a configuration for the given servers with default settings
    pub fn new<S: Into<String>>(servers: impl IntoIterator<Item = S>) -> Self {
        Self {
            servers: servers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the transport
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Set the number of rounds per check
    pub fn with_attempts_per_check(mut self, attempts: usize) -> Self {
        self.attempts_per_check = attempts;
        self
    }

    /// Set the pause between failed checks
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = duration_to_ms(interval);
        self
    }

    /// Set all three per-query timeouts at once
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        let ms = duration_to_ms(timeout);
        self.dial_timeout_ms = ms;
        self.read_timeout_ms = ms;
        self.write_timeout_ms = ms;
        self
    }

    /// Set the overall deadline
    pub fn with_overall_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.overall_deadline_ms = deadline.map(duration_to_ms);
        self
    }

    /// Pause between failed checks
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Per-query timeouts
    pub fn probe_timeouts(&self) -> ProbeTimeouts {
        ProbeTimeouts {
            dial: Duration::from_millis(self.dial_timeout_ms),
            read: Duration::from_millis(self.read_timeout_ms),
            write: Duration::from_millis(self.write_timeout_ms),
        }
    }

    /// Overall deadline as a duration
    pub fn overall_deadline(&self) -> Option<Duration> {
        self.overall_deadline_ms.map(Duration::from_millis)
    }

    /// Endpoints built from the server list and the configured transport
    pub fn endpoints(&self) -> Vec<ServerEndpoint> {
        self.servers
            .iter()
            .map(|server| ServerEndpoint::new(server.clone(), self.transport))
            .collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.servers.is_empty() {
            return Err(crate::Error::config("No authoritative servers configured"));
        }

        for server in &self.servers {
            validate_server_address(server)?;
        }

        if self.attempts_per_check == 0 {
            return Err(crate::Error::config("attempts_per_check must be >= 1"));
        }

        if self.dial_timeout_ms == 0 || self.read_timeout_ms == 0 || self.write_timeout_ms == 0 {
            return Err(crate::Error::config("Per-query timeouts must be > 0"));
        }

        let slowest = self
            .dial_timeout_ms
            .max(self.read_timeout_ms)
            .max(self.write_timeout_ms);
        if slowest >= self.poll_interval_ms {
            tracing::warn!(
                "Per-query timeout ({}ms) is not smaller than the poll interval ({}ms); \
                 in-flight probes may overrun the overall deadline",
                slowest,
                self.poll_interval_ms
            );
        }

        Ok(())
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            transport: Transport::default(),
            attempts_per_check: default_attempts_per_check(),
            poll_interval_ms: default_poll_interval_ms(),
            dial_timeout_ms: default_timeout_ms(),
            read_timeout_ms: default_timeout_ms(),
            write_timeout_ms: default_timeout_ms(),
            overall_deadline_ms: None,
        }
    }
}

/// Check that a server address has the `host:port` shape
fn validate_server_address(server: &str) -> Result<(), crate::Error> {
    let (host, port) = server.rsplit_once(':').ok_or_else(|| {
        crate::Error::config(format!("Server address '{}' must be host:port", server))
    })?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(crate::Error::config(format!(
            "Server address '{}' has an empty host",
            server
        )));
    }

    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(crate::Error::config(format!(
            "Server address '{}' has an invalid port",
            server
        ))),
        Ok(_) => Ok(()),
    }
}

fn duration_to_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn default_attempts_per_check() -> usize {
    10
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    1000
}
