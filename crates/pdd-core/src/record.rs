//! What is being verified, and how a live answer is compared against it
//!
//! A [`RecordFingerprint`] names one record (`fqdn`, type, expected value).
//! A [`Comparator`] is the equality rule for one record type; it is chosen
//! once per probe from the requested type.

use hickory_proto::rr::{RData, Record, RecordType};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracing::warn;

/// Immutable description of the record whose propagation is verified
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordFingerprint {
    fqdn: String,
    record_type: String,
    expected_value: String,
}

impl RecordFingerprint {
    /// Create a fingerprint
    ///
    /// The name is made fully qualified (trailing dot) and the type token is
    /// upper-cased. The type is not checked here: an unknown type is reported
    /// by the probe, so operators can tell it apart from a missing record.
    pub fn new(
        fqdn: impl Into<String>,
        record_type: impl AsRef<str>,
        expected_value: impl Into<String>,
    ) -> Self {
        let mut fqdn = fqdn.into();
        if !fqdn.ends_with('.') {
            fqdn.push('.');
        }

        Self {
            fqdn,
            record_type: record_type.as_ref().trim().to_ascii_uppercase(),
            expected_value: expected_value.into(),
        }
    }

    /// Fingerprint for `subdomain.domain`
    pub fn for_subdomain(
        subdomain: &str,
        domain: &str,
        record_type: impl AsRef<str>,
        expected_value: impl Into<String>,
    ) -> Self {
        let domain = domain.trim_end_matches('.');
        let fqdn = match subdomain {
            "" | "@" => domain.to_string(),
            sub => format!("{}.{}", sub, domain),
        };
        Self::new(fqdn, record_type, expected_value)
    }

    /// Fully qualified name, always ending with a dot
    pub fn fqdn(&self) -> &str {
        &self.fqdn
    }

    /// Upper-cased record type token
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Value the live record must carry
    pub fn expected_value(&self) -> &str {
        &self.expected_value
    }

    /// Resolve the type token to a wire record type
    ///
    /// Returns `None` for tokens that name no DNS type.
    pub fn wire_type(&self) -> Option<RecordType> {
        match RecordType::from_str(&self.record_type) {
            Ok(RecordType::Unknown(_)) | Err(_) => None,
            Ok(record_type) => Some(record_type),
        }
    }
}

impl std::fmt::Display for RecordFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.fqdn, self.record_type, self.expected_value)
    }
}

/// Equality rule for one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparator {
    /// A/AAAA: compare address bytes, not text
    Address(Option<IpAddr>),
    /// CNAME, NS, MX, SRV: exact text of the target name
    Target(String),
    /// TXT: expected value equals one of the text segments
    TextSegment(String),
    /// Any other type: expected value is a substring of the rendered record
    Contains(String),
}

impl Comparator {
    /// Pick the comparator for a record type
    pub fn for_type(record_type: RecordType, expected: &str) -> Self {
        match record_type {
            RecordType::A | RecordType::AAAA => {
                let parsed = parse_address(expected);
                if parsed.is_none() {
                    warn!(
                        "Expected value '{}' is not an IP address, {} record can never match",
                        expected, record_type
                    );
                }
                Comparator::Address(parsed)
            }
            RecordType::CNAME | RecordType::NS | RecordType::MX | RecordType::SRV => {
                Comparator::Target(expected.to_string())
            }
            RecordType::TXT => Comparator::TextSegment(expected.to_string()),
            _ => Comparator::Contains(expected.to_string()),
        }
    }

    /// Whether one answer record carries the expected value
    ///
    /// The caller filters answers by type first; record data of an
    /// unexpected shape never matches.
    pub fn matches(&self, record: &Record) -> bool {
        match (self, record.data()) {
            (Comparator::Address(Some(expected)), RData::A(a)) => {
                same_address(*expected, IpAddr::V4(a.0))
            }
            (Comparator::Address(Some(expected)), RData::AAAA(aaaa)) => {
                same_address(*expected, IpAddr::V6(aaaa.0))
            }
            (Comparator::Address(_), _) => false,
            (Comparator::Target(expected), RData::CNAME(cname)) => cname.0.to_string() == *expected,
            (Comparator::Target(expected), RData::NS(ns)) => ns.0.to_string() == *expected,
            (Comparator::Target(expected), RData::MX(mx)) => mx.exchange().to_string() == *expected,
            (Comparator::Target(expected), RData::SRV(srv)) => {
                srv.target().to_string() == *expected
            }
            (Comparator::Target(_), _) => false,
            (Comparator::TextSegment(expected), RData::TXT(txt)) => txt
                .txt_data()
                .iter()
                .any(|segment| &segment[..] == expected.as_bytes()),
            (Comparator::TextSegment(_), _) => false,
            (Comparator::Contains(expected), _) => {
                let rendered = record.to_string();
                warn!(
                    "No specific check for record type '{}', checking that '{}' is contained in: {}",
                    record.record_type(),
                    expected,
                    rendered
                );
                rendered.contains(expected.as_str())
            }
        }
    }
}

/// Parse an expected address
///
/// Dotted-decimal IPv4 with zero-padded octets (`127.000.000.001`) is
/// accepted as decimal.
fn parse_address(value: &str) -> Option<IpAddr> {
    let value = value.trim();
    if let Ok(ip) = value.parse::<IpAddr>() {
        return Some(ip);
    }

    let mut octets = [0u8; 4];
    let mut parts = value.split('.');
    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }

    Some(IpAddr::V4(Ipv4Addr::from(octets)))
}

/// IPv4 and IPv4-mapped IPv6 forms of one address compare equal
fn same_address(a: IpAddr, b: IpAddr) -> bool {
    a.to_canonical() == b.to_canonical()
}
