// # Record Probe Trait
//
// Defines the interface for asking one authoritative server whether it
// serves the expected record.
//
// ## Implementations
//
// - Wire DNS over TCP/UDP: `pdd_core::probe::DnsProbe`
// - Test doubles: scripted probes in `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use pdd_core::{RecordFingerprint, RecordProbe, ServerEndpoint, Transport};
//
// let endpoint = ServerEndpoint::new("dns1.yandex.ru:53", Transport::Tcp);
// let fingerprint = RecordFingerprint::new("sub.example.com", "A", "127.0.0.1");
//
// let outcome = probe.probe(&endpoint, &fingerprint).await;
// println!("matched: {}", outcome.matched);
// ```

use crate::config::ServerEndpoint;
use crate::record::RecordFingerprint;
use async_trait::async_trait;

/// Result of one query against one server
///
/// Not retained beyond the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Whether an answer record carried the expected value
    pub matched: bool,
}

impl ProbeOutcome {
    /// The server answered with the expected value
    pub fn matched() -> Self {
        Self { matched: true }
    }

    /// The server did not answer with the expected value, or did not answer
    pub fn unmatched() -> Self {
        Self { matched: false }
    }
}

impl From<bool> for ProbeOutcome {
    fn from(matched: bool) -> Self {
        Self { matched }
    }
}

/// Trait for single-server record probes
///
/// # Contract
///
/// - One query per call, against the given endpoint only.
/// - Never fails: transport errors, timeouts and malformed answers are
///   logged and reported as `matched = false`.
/// - No state survives a call: the same server answer always yields the
///   same outcome.
/// - No retries and no sleeping. Repetition and pacing are owned by
///   [`PropagationEngine`](crate::PropagationEngine).
///
/// # Thread Safety
///
/// The engine runs one probe per endpoint concurrently on spawned tasks, so
/// implementations must be `Send + Sync` and `'static`.
#[async_trait]
pub trait RecordProbe: Send + Sync {
    /// Query `endpoint` for the fingerprint's name and type and compare
    /// the answers against its expected value
    async fn probe(&self, endpoint: &ServerEndpoint, fingerprint: &RecordFingerprint)
    -> ProbeOutcome;

    /// Get the probe name (for logging/debugging)
    fn probe_name(&self) -> &'static str;
}
