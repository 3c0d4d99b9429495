// # Registrar Trait
//
// Defines the interface for managing records through a registrar's HTTP API.
//
// ## Implementations
//
// - Yandex PDD: `pdd-registrar-yandex` crate
//
// Registrars are single-shot: one API call per method, no retries, no
// background tasks. Propagation checks never go through a registrar; they
// query the authoritative servers directly (see `PropagationEngine`).

use crate::error::Result;
use crate::record::RecordFingerprint;
use async_trait::async_trait;

/// A record to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Subdomain relative to the managed domain (`@` for the apex)
    pub subdomain: String,
    /// Upper-cased record type token
    pub record_type: String,
    /// Record content; for SRV records this is the target
    pub content: String,
    /// Priority (MX and SRV)
    pub priority: Option<u16>,
    /// Weight (SRV)
    pub weight: Option<u16>,
    /// Port (SRV)
    pub port: Option<u16>,
    /// TTL in seconds; `None` leaves the registrar default
    pub ttl: Option<u32>,
}

impl NewRecord {
    /// Create a plain record (A, AAAA, CNAME, NS, TXT, ...)
    pub fn new(
        subdomain: impl Into<String>,
        record_type: impl AsRef<str>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            subdomain: subdomain.into(),
            record_type: record_type.as_ref().to_ascii_uppercase(),
            content: content.into(),
            priority: None,
            weight: None,
            port: None,
            ttl: None,
        }
    }

    /// Create an MX record
    pub fn mx(subdomain: impl Into<String>, priority: u16, exchange: impl Into<String>) -> Self {
        Self {
            priority: Some(priority),
            ..Self::new(subdomain, "MX", exchange)
        }
    }

    /// Create an SRV record
    pub fn srv(
        subdomain: impl Into<String>,
        priority: u16,
        weight: u16,
        port: u16,
        target: impl Into<String>,
    ) -> Self {
        Self {
            priority: Some(priority),
            weight: Some(weight),
            port: Some(port),
            ..Self::new(subdomain, "SRV", target)
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: Option<u32>) -> Self {
        self.ttl = ttl;
        self
    }

    /// What a propagation check for this record should look for
    ///
    /// Priority, weight and port are not part of the comparison, so the
    /// expected value is always the content (the target for MX and SRV).
    pub fn fingerprint(&self, domain: &str) -> RecordFingerprint {
        RecordFingerprint::for_subdomain(
            &self.subdomain,
            domain,
            &self.record_type,
            self.content.clone(),
        )
    }
}

/// A record as listed by the registrar
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEntry {
    /// Registrar-assigned record id
    pub id: u64,
    /// Subdomain relative to the managed domain
    pub subdomain: String,
    /// Record type token
    pub record_type: String,
    /// TTL in seconds
    pub ttl: u32,
    /// Priority, as reported by the registrar (MX and SRV)
    pub priority: Option<serde_json::Value>,
    /// Record content
    pub content: String,
}

/// Trait for registrar API clients
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Errors
///
/// Every method returns the registrar's own error message in
/// [`Error::Registrar`](crate::Error::Registrar) when the API reports a
/// failure, and [`Error::Http`](crate::Error::Http) when it cannot be reached.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Create a record under `domain`
    async fn add_record(&self, domain: &str, record: &NewRecord) -> Result<()>;

    /// Delete the record with the given registrar id
    async fn delete_record(&self, domain: &str, record_id: &str) -> Result<()>;

    /// List every record of `domain`
    async fn list_records(&self, domain: &str) -> Result<Vec<RecordEntry>>;

    /// Authoritative servers (`host:port`) that serve this registrar's zones
    fn authoritative_servers(&self) -> Vec<String>;

    /// Get the registrar name (for logging/debugging)
    fn registrar_name(&self) -> &'static str;
}
