// # Yandex PDD Registrar
//
// This crate provides a `Registrar` implementation for the Yandex PDD
// ("Pochta dlya domena") admin API.
//
// ## Scope
//
// - One HTTP request per trait call
// - Errors reported by the API are returned verbatim in `Error::Registrar`
// - No retry, backoff or caching; callers decide what to do on failure
// - No background tasks
//
// ## Security Requirements
//
// - The PDD token NEVER appears in logs or Debug output
// - Construction fails if the token is empty
// - Redirects are not followed, so the token header is never replayed to
//   another host
//
// ## API Reference
//
// Every endpoint lives under `https://pddimp.yandex.ru/api2/admin/` and
// authenticates with a `PddToken` header. Parameters are form-encoded.
//
// - Add record: POST `dns/add` (`domain`, `type`, `subdomain`, `content`,
//   plus `priority` for MX, `priority`/`weight`/`port`/`target` for SRV,
//   and `ttl` when set)
// - Delete record: POST `dns/del` (`domain`, `record_id`)
// - List records: GET `dns/list?domain=...`
//
// Every response is a JSON envelope `{"success": "ok" | "error", "error": "..."}`.

use async_trait::async_trait;
use pdd_core::traits::{NewRecord, RecordEntry, Registrar};
use pdd_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// PDD admin API base URL
pub const PDD_API_BASE: &str = "https://pddimp.yandex.ru/api2/admin";

/// Authoritative name servers for domains delegated to Yandex
pub const YANDEX_NAME_SERVERS: [&str; 2] = ["dns1.yandex.ru:53", "dns2.yandex.ru:53"];

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const REGISTRAR_NAME: &str = "yandex";

/// Yandex PDD registrar client
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the token.
pub struct YandexPddRegistrar {
    /// PDD admin token
    /// ⚠️ NEVER log this value
    token: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// API base URL without trailing slash
    base_url: String,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for YandexPddRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexPddRegistrar")
            .field("token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl YandexPddRegistrar {
    /// Create a client for the production API
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the token is empty
    /// - `Error::Http` if the HTTP client cannot be built
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::config("PDD token is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            token,
            client,
            base_url: PDD_API_BASE.to_string(),
        })
    }

    /// Point the client at another API root (test servers, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// API root in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request and decode the response envelope
    async fn send<T>(&self, request: reqwest::RequestBuilder, path: &str) -> Result<T>
    where
        T: DeserializeOwned + PddResponse,
    {
        tracing::debug!(endpoint = path, "PDD request");

        let response = request
            .header("PddToken", &self.token)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", path, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read {} response: {}", path, e)))?;

        match status.as_u16() {
            401 | 403 => {
                return Err(Error::auth(format!(
                    "PDD token rejected or lacks permissions. Status: {}",
                    status
                )));
            }
            300..=399 => {
                return Err(Error::http(format!(
                    "Unexpected redirect from {}. Status: {}",
                    path, status
                )));
            }
            _ => {}
        }

        // The API reports most failures inside the envelope, whatever the status
        let parsed: T = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(Error::http(format!("{} failed: {} - {}", path, status, body)));
            }
            Err(e) => {
                return Err(Error::registrar(
                    REGISTRAR_NAME,
                    format!("Parse PDD answer: {}", e),
                ));
            }
        };

        parsed.envelope().check()?;
        Ok(parsed)
    }
}

#[async_trait]
impl Registrar for YandexPddRegistrar {
    async fn add_record(&self, domain: &str, record: &NewRecord) -> Result<()> {
        tracing::info!(
            "Adding {} record {} to {}",
            record.record_type,
            record.subdomain,
            domain
        );

        let params = add_params(domain, record);
        let request = self.client.post(self.endpoint("dns/add")).form(&params);
        let _: Envelope = self.send(request, "dns/add").await?;

        tracing::info!("Record added: {}.{}", record.subdomain, domain);
        Ok(())
    }

    async fn delete_record(&self, domain: &str, record_id: &str) -> Result<()> {
        tracing::info!("Deleting record {} from {}", record_id, domain);

        let params = [("domain", domain), ("record_id", record_id)];
        let request = self.client.post(self.endpoint("dns/del")).form(&params);
        let _: Envelope = self.send(request, "dns/del").await?;

        Ok(())
    }

    async fn list_records(&self, domain: &str) -> Result<Vec<RecordEntry>> {
        let request = self
            .client
            .get(self.endpoint("dns/list"))
            .query(&[("domain", domain)]);
        let response: ListResponse = self.send(request, "dns/list").await?;

        tracing::debug!("Listed {} records for {}", response.records.len(), domain);
        Ok(response
            .records
            .into_iter()
            .map(ListedRecord::into_entry)
            .collect())
    }

    fn authoritative_servers(&self) -> Vec<String> {
        YANDEX_NAME_SERVERS.iter().map(|s| s.to_string()).collect()
    }

    fn registrar_name(&self) -> &'static str {
        REGISTRAR_NAME
    }
}

/// Form parameters for `dns/add`
///
/// SRV records carry their target as `target`, every other type as
/// `content`. The TTL is only sent when set.
fn add_params(domain: &str, record: &NewRecord) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("domain", domain.to_string()),
        ("type", record.record_type.clone()),
        ("subdomain", record.subdomain.clone()),
    ];

    if let Some(priority) = record.priority {
        params.push(("priority", priority.to_string()));
    }

    if record.record_type == "SRV" {
        if let Some(weight) = record.weight {
            params.push(("weight", weight.to_string()));
        }
        if let Some(port) = record.port {
            params.push(("port", port.to_string()));
        }
        params.push(("target", record.content.clone()));
    } else {
        params.push(("content", record.content.clone()));
    }

    if let Some(ttl) = record.ttl {
        params.push(("ttl", ttl.to_string()));
    }

    params
}

/// Common part of every PDD response
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: String,
    #[serde(default)]
    error: Option<String>,
}

impl Envelope {
    fn check(&self) -> Result<()> {
        if self.success == "ok" {
            return Ok(());
        }

        let message = self
            .error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or("unknown error");
        Err(Error::registrar(REGISTRAR_NAME, message))
    }
}

/// Responses that carry an [`Envelope`]
trait PddResponse {
    fn envelope(&self) -> &Envelope;
}

impl PddResponse for Envelope {
    fn envelope(&self) -> &Envelope {
        self
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(flatten)]
    envelope: Envelope,
    #[serde(default)]
    records: Vec<ListedRecord>,
}

impl PddResponse for ListResponse {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

#[derive(Debug, Deserialize)]
struct ListedRecord {
    record_id: u64,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    ttl: u32,
    #[serde(default)]
    subdomain: String,
    #[serde(default)]
    priority: Option<serde_json::Value>,
    #[serde(default)]
    content: String,
}

impl ListedRecord {
    fn into_entry(self) -> RecordEntry {
        RecordEntry {
            id: self.record_id,
            subdomain: self.subdomain,
            record_type: self.record_type,
            ttl: self.ttl,
            priority: self.priority,
            content: self.content,
        }
    }
}
