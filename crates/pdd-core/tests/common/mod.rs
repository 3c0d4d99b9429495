//! Test doubles and common utilities for propagation contract tests
//!
//! - [`ScriptedProbe`]: a `RecordProbe` whose answers follow a script and
//!   whose calls are counted per server
//! - [`MockAuthoritativeServer`]: a real UDP/TCP DNS responder on localhost

#![allow(dead_code)]

use hickory_proto::op::{Message, MessageType, OpCode};
use hickory_proto::rr::rdata::{A, AAAA, TXT};
use hickory_proto::rr::{Name, RData, Record};
use pdd_core::traits::{ProbeOutcome, RecordProbe};
use pdd_core::{RecordFingerprint, ServerEndpoint, VerificationConfig};
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

/// Addresses used by scripted tests (never dialled)
pub const NS1: &str = "ns1.test:53";
pub const NS2: &str = "ns2.test:53";

type Rule = dyn Fn(&str, usize) -> bool + Send + Sync;

/// A RecordProbe driven by a rule `(server address, nth call to it) -> matched`
///
/// Calls are numbered from 1 per server and counted before any delay, so a
/// counter reflects every probe that was started.
pub struct ScriptedProbe {
    rule: Box<Rule>,
    delay: Duration,
    delays: HashMap<String, Duration>,
    calls: Mutex<HashMap<String, usize>>,
    total_calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(rule: impl Fn(&str, usize) -> bool + Send + Sync + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            delay: Duration::ZERO,
            delays: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
            total_calls: AtomicUsize::new(0),
        }
    }

    /// Every probe returns the same result
    pub fn always(matched: bool) -> Self {
        Self::new(move |_, _| matched)
    }

    /// Delay every probe
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay probes to one server
    pub fn with_delay_for(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }

    /// Number of probes started against `address`
    pub fn calls_to(&self, address: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    /// Number of probes started against any server
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecordProbe for ScriptedProbe {
    async fn probe(
        &self,
        endpoint: &ServerEndpoint,
        _fingerprint: &RecordFingerprint,
    ) -> ProbeOutcome {
        let nth = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(endpoint.address.clone()).or_insert(0);
            *count += 1;
            *count
        };
        self.total_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self
            .delays
            .get(&endpoint.address)
            .copied()
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        ProbeOutcome::from((self.rule)(&endpoint.address, nth))
    }

    fn probe_name(&self) -> &'static str {
        "scripted"
    }
}

/// How a mock server responds
#[derive(Debug, Clone)]
pub enum ServerBehavior {
    /// Answer every query with these records
    Answer(Vec<Record>),
    /// Answer with the right records but a different message id
    WrongId(Vec<Record>),
    /// Never answer
    Silent,
}

/// A DNS server on localhost answering with fixed records
pub struct MockAuthoritativeServer {
    address: String,
    queries: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockAuthoritativeServer {
    /// Start a UDP responder
    pub async fn udp(behavior: ServerBehavior) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let address = socket.local_addr().unwrap().to_string();
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&queries);

        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
                counter.fetch_add(1, Ordering::SeqCst);
                if let Some(reply) = respond(&behavior, &buf[..len]) {
                    let _ = socket.send_to(&reply, peer).await;
                }
            }
        });

        Self {
            address,
            queries,
            task,
        }
    }

    /// Start a TCP responder
    pub async fn tcp(behavior: ServerBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&queries);
        let behavior = Arc::new(behavior);

        let task = tokio::spawn(async move {
            while let Ok((mut conn, _)) = listener.accept().await {
                let counter = Arc::clone(&counter);
                let behavior = Arc::clone(&behavior);
                tokio::spawn(async move {
                    while let Ok(len) = conn.read_u16().await {
                        let mut body = vec![0u8; usize::from(len)];
                        if conn.read_exact(&mut body).await.is_err() {
                            break;
                        }
                        counter.fetch_add(1, Ordering::SeqCst);

                        let Some(reply) = respond(&behavior, &body) else {
                            continue;
                        };
                        let mut framed = (reply.len() as u16).to_be_bytes().to_vec();
                        framed.extend_from_slice(&reply);
                        if conn.write_all(&framed).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        Self {
            address,
            queries,
            task,
        }
    }

    /// `host:port` the server listens on
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Number of queries received
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockAuthoritativeServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn respond(behavior: &ServerBehavior, request: &[u8]) -> Option<Vec<u8>> {
    let request = Message::from_vec(request).ok()?;

    let (id, records) = match behavior {
        ServerBehavior::Answer(records) => (request.id(), records),
        ServerBehavior::WrongId(records) => (request.id().wrapping_add(1), records),
        ServerBehavior::Silent => return None,
    };

    let mut response = Message::new();
    response
        .set_id(id)
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_authoritative(true)
        .add_queries(request.queries().to_vec())
        .add_answers(records.iter().cloned());

    response.to_vec().ok()
}

pub fn name(s: &str) -> Name {
    Name::from_ascii(s).unwrap()
}

pub fn a_record(owner: &str, ip: Ipv4Addr) -> Record {
    Record::from_rdata(name(owner), 300, RData::A(A::from(ip)))
}

pub fn aaaa_record(owner: &str, ip: Ipv6Addr) -> Record {
    Record::from_rdata(name(owner), 300, RData::AAAA(AAAA::from(ip)))
}

pub fn txt_record(owner: &str, segments: &[&str]) -> Record {
    let segments = segments.iter().map(|s| s.to_string()).collect();
    Record::from_rdata(name(owner), 300, RData::TXT(TXT::new(segments)))
}

/// `sub.example.com. A 127.0.0.1`
pub fn localhost_fingerprint() -> RecordFingerprint {
    RecordFingerprint::new("sub.example.com.", "A", "127.0.0.1")
}

/// Two scripted servers, default settings otherwise
pub fn two_server_config() -> VerificationConfig {
    VerificationConfig::new([NS1, NS2])
}

/// Short timeouts for tests that talk to real sockets
pub fn fast_wire_config(servers: &[&str]) -> VerificationConfig {
    VerificationConfig::new(servers.iter().copied())
        .with_probe_timeout(Duration::from_millis(200))
        .with_poll_interval(Duration::from_millis(500))
}
