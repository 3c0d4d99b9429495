//! Wire DNS probe
//!
//! [`DnsProbe`] sends one question straight to an authoritative server and
//! checks the answer section against the fingerprint's expected value.
//!
//! ## Soft failures
//!
//! Transport errors, timeouts, undecodable responses and id mismatches are
//! logged and reported as `matched = false`. They are never escalated: the
//! engine simply tries again on the next round.

mod transport;

use crate::config::{ProbeTimeouts, ServerEndpoint, VerificationConfig};
use crate::error::ProbeError;
use crate::record::{Comparator, RecordFingerprint};
use crate::traits::{ProbeOutcome, RecordProbe};
use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use tracing::{debug, warn};

/// Probe that queries authoritative servers over the DNS wire protocol
#[derive(Debug, Clone, Default)]
pub struct DnsProbe {
    /// Per-query I/O timeouts
    timeouts: ProbeTimeouts,
}

impl DnsProbe {
    /// Create a probe with the given per-query timeouts
    pub fn new(timeouts: ProbeTimeouts) -> Self {
        Self { timeouts }
    }

    /// Create a probe using the timeouts of a verification config
    pub fn from_config(config: &VerificationConfig) -> Self {
        Self::new(config.probe_timeouts())
    }

    /// Per-query timeouts in use
    pub fn timeouts(&self) -> &ProbeTimeouts {
        &self.timeouts
    }

    /// Query one server and compare its answers
    async fn lookup(
        &self,
        endpoint: &ServerEndpoint,
        fingerprint: &RecordFingerprint,
    ) -> Result<bool, ProbeError> {
        let record_type = fingerprint
            .wire_type()
            .ok_or_else(|| ProbeError::UnsupportedType(fingerprint.record_type().to_string()))?;

        let (id, query) = build_query(fingerprint.fqdn(), record_type)?;
        let response = transport::exchange(endpoint, &query, &self.timeouts).await?;

        let answer = Message::from_vec(&response).map_err(|e| ProbeError::Decode(e.to_string()))?;
        if answer.id() != id {
            return Err(ProbeError::IdMismatch {
                sent: id,
                received: answer.id(),
            });
        }

        if answer.truncated() {
            debug!(server = %endpoint, "Truncated answer, only the records received are checked");
        }

        Ok(answer_matches(
            &answer,
            record_type,
            fingerprint.expected_value(),
        ))
    }
}

#[async_trait]
impl RecordProbe for DnsProbe {
    async fn probe(
        &self,
        endpoint: &ServerEndpoint,
        fingerprint: &RecordFingerprint,
    ) -> ProbeOutcome {
        match self.lookup(endpoint, fingerprint).await {
            Ok(matched) => {
                debug!(
                    server = %endpoint,
                    record = %fingerprint.fqdn(),
                    record_type = %fingerprint.record_type(),
                    matched,
                    "Probe finished"
                );
                ProbeOutcome::from(matched)
            }
            Err(ProbeError::UnsupportedType(token)) => {
                warn!(
                    record = %fingerprint.fqdn(),
                    "Unknown record type '{}', cannot verify propagation", token
                );
                ProbeOutcome::unmatched()
            }
            Err(e) => {
                warn!(server = %endpoint, error = %e, "Can't read answer from dns server");
                ProbeOutcome::unmatched()
            }
        }
    }

    fn probe_name(&self) -> &'static str {
        "dns"
    }
}

/// Encode a single-question query with a random id
fn build_query(fqdn: &str, record_type: RecordType) -> Result<(u16, Vec<u8>), ProbeError> {
    let name = Name::from_ascii(fqdn).map_err(|e| ProbeError::InvalidName {
        name: fqdn.to_string(),
        reason: e.to_string(),
    })?;

    let id: u16 = rand::random();
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false)
        .add_query(Query::query(name, record_type));

    let bytes = message
        .to_vec()
        .map_err(|e| ProbeError::Encode(e.to_string()))?;

    Ok((id, bytes))
}

/// Whether any answer record of `record_type` carries `expected`
///
/// Records of other types (for example the CNAME chain in front of an A
/// record) are skipped. The first matching record wins; other records of
/// the same type may carry different values.
pub fn answer_matches(answer: &Message, record_type: RecordType, expected: &str) -> bool {
    let comparator = Comparator::for_type(record_type, expected);
    answer
        .answers()
        .iter()
        .filter(|record| record.record_type() == record_type)
        .any(|record| comparator.matches(record))
}
