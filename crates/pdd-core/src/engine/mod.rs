//! Propagation verification engine
//!
//! The PropagationEngine is responsible for:
//! - Fanning one check out to every authoritative server (quorum)
//! - Repeating the quorum back-to-back to filter flapping answers (stability)
//! - Polling until the record is stable everywhere or the deadline passes
//!
//! ## Architecture
//!
//! ```text
//! poll_until_propagated ── loop until Propagated / TimedOut
//!          │
//!          ▼
//!       stable ─────────── attempts_per_check rounds, fail fast
//!          │
//!          ▼
//!       quorum ─────────── one spawned probe per server, all must match
//!          │
//!   ┌──────┴──────┐
//!   ▼             ▼
//! probe(ns1)   probe(ns2)
//! ```
//!
//! Results flow back up unchanged. Nothing is cached between calls; the
//! only shared input is the read-only [`Cancellation`].

use crate::cancel::Cancellation;
use crate::config::{ServerEndpoint, VerificationConfig};
use crate::error::Result;
use crate::probe::DnsProbe;
use crate::record::RecordFingerprint;
use crate::traits::RecordProbe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Terminal result of a propagation poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationVerdict {
    /// Every server returned the expected value in every round of a check
    Propagated,
    /// The deadline passed (or the run was cancelled) first
    TimedOut,
}

impl VerificationVerdict {
    /// Whether the record is live everywhere
    pub fn is_propagated(&self) -> bool {
        matches!(self, VerificationVerdict::Propagated)
    }
}

/// Propagation verification engine
///
/// ## Lifecycle
///
/// 1. Create with [`PropagationEngine::new()`] (validates configuration)
/// 2. Call [`PropagationEngine::poll_until_propagated()`] or
///    [`PropagationEngine::verify()`] for each record
///
/// The engine holds no per-record state, so one instance can verify any
/// number of records, sequentially or concurrently.
pub struct PropagationEngine {
    /// Probe used for every server query
    probe: Arc<dyn RecordProbe>,

    /// Authoritative servers, fixed at construction
    endpoints: Vec<ServerEndpoint>,

    /// Consecutive successful rounds required per check
    attempts_per_check: usize,

    /// Pause between failed checks
    poll_interval: Duration,

    /// Deadline used by `verify()`
    overall_deadline: Option<Duration>,
}

impl PropagationEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `probe`: Probe implementation used for every server query
    /// - `config`: Verification configuration
    ///
    /// # Returns
    ///
    /// - `Ok(PropagationEngine)`: Ready to verify records
    /// - `Err(Error::Config)`: If the configuration is unusable (for example
    ///   an empty server list)
    pub fn new(probe: Arc<dyn RecordProbe>, config: VerificationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            probe,
            endpoints: config.endpoints(),
            attempts_per_check: config.attempts_per_check,
            poll_interval: config.poll_interval(),
            overall_deadline: config.overall_deadline(),
        })
    }

    /// Create an engine that queries servers over the DNS wire protocol
    pub fn with_dns_probe(config: VerificationConfig) -> Result<Self> {
        let probe = Arc::new(DnsProbe::from_config(&config));
        Self::new(probe, config)
    }

    /// Servers every check is fanned out to
    pub fn endpoints(&self) -> &[ServerEndpoint] {
        &self.endpoints
    }

    /// One verification attempt against every server in parallel
    ///
    /// Returns `true` only if every server matched. Returns `false` as soon
    /// as one server reports a mismatch; the remaining probes finish in the
    /// background and their results are discarded.
    pub async fn quorum(&self, fingerprint: &RecordFingerprint) -> bool {
        let fan_out = self.endpoints.len();

        // One slot per probe, so a late probe can always deposit its result
        let (tx, mut rx) = mpsc::channel::<bool>(fan_out);

        for endpoint in &self.endpoints {
            let tx = tx.clone();
            let probe = Arc::clone(&self.probe);
            let endpoint = endpoint.clone();
            let fingerprint = fingerprint.clone();

            tokio::spawn(async move {
                let outcome = probe.probe(&endpoint, &fingerprint).await;
                // The receiver is gone once the caller has decided
                let _ = tx.try_send(outcome.matched);
            });
        }
        drop(tx);

        for _ in 0..fan_out {
            match rx.recv().await {
                Some(true) => {}
                Some(false) => return false,
                None => {
                    warn!("Probe task ended without reporting a result");
                    return false;
                }
            }
        }

        true
    }

    /// Run `attempts_per_check` quorum rounds back-to-back
    ///
    /// Fails fast: the first failing round ends the check. There is no pause
    /// between rounds.
    pub async fn stable(&self, fingerprint: &RecordFingerprint) -> bool {
        for round in 1..=self.attempts_per_check {
            if !self.quorum(fingerprint).await {
                debug!(
                    record = %fingerprint.fqdn(),
                    "Round {}/{} failed",
                    round,
                    self.attempts_per_check
                );
                return false;
            }
        }

        true
    }

    /// Poll until the record is stable on every server or `cancel` fires
    ///
    /// No new check starts after the deadline. A check already running when
    /// the deadline passes is allowed to finish (probes are bounded by their
    /// own I/O timeouts).
    pub async fn poll_until_propagated(
        &self,
        fingerprint: &RecordFingerprint,
        cancel: &Cancellation,
    ) -> VerificationVerdict {
        loop {
            if cancel.is_expired() {
                break;
            }

            info!(record = %fingerprint, "Check record");
            if self.stable(fingerprint).await {
                info!(record = %fingerprint, "Record propagated to all servers");
                return VerificationVerdict::Propagated;
            }

            if cancel.is_expired() {
                break;
            }

            if self.should_sleep(cancel.deadline()) {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        warn!(record = %fingerprint, "Record did not propagate before the deadline");
        VerificationVerdict::TimedOut
    }

    /// Poll under the configured overall deadline
    pub async fn verify(&self, fingerprint: &RecordFingerprint) -> VerificationVerdict {
        let (cancel, _handle) = Cancellation::until(
            self.overall_deadline
                .map(|deadline| Instant::now() + deadline),
        );
        self.poll_until_propagated(fingerprint, &cancel).await
    }

    /// Whether a full poll interval still fits before the deadline
    ///
    /// Without a deadline the loop always sleeps. Near the deadline it skips
    /// the sleep and checks again immediately, so the deadline is observed
    /// on time.
    fn should_sleep(&self, deadline: Option<Instant>) -> bool {
        match deadline {
            None => true,
            Some(deadline) => Instant::now() + self.poll_interval < deadline,
        }
    }
}

impl std::fmt::Debug for PropagationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropagationEngine")
            .field("probe", &self.probe.probe_name())
            .field("endpoints", &self.endpoints)
            .field("attempts_per_check", &self.attempts_per_check)
            .field("poll_interval", &self.poll_interval)
            .field("overall_deadline", &self.overall_deadline)
            .finish()
    }
}
