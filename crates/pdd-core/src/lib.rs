// # pdd-core
//
// Core library for managing registrar DNS records and confirming that a
// published record is live on the registrar's authoritative servers.
//
// ## Architecture Overview
//
// - **RecordProbe**: Trait for asking one authoritative server about one record
// - **DnsProbe**: Wire implementation (UDP/TCP, per-phase timeouts)
// - **PropagationEngine**: Quorum → stability → poll loop under a deadline
// - **Cancellation**: Read-only deadline/cancel signal shared by a run
// - **Registrar**: Trait for the registrar's record CRUD API
//
// ## Design Principles
//
// 1. **Read-only verification**: live answers are compared against an
//    expected value, nothing is stored between calls
// 2. **Unanimity**: every configured server must agree, in every round
// 3. **Soft probe failures**: network trouble means "not yet", never an error
// 4. **Bounded time**: the caller's deadline ends polling; probes carry their
//    own small I/O timeouts

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod probe;
pub mod record;
pub mod traits;

// Re-export core types for convenience
pub use cancel::{CancelHandle, Cancellation};
pub use config::{ProbeTimeouts, ServerEndpoint, Transport, VerificationConfig};
pub use engine::{PropagationEngine, VerificationVerdict};
pub use error::{Error, ProbeError, Result};
pub use probe::DnsProbe;
pub use record::{Comparator, RecordFingerprint};
pub use traits::{NewRecord, ProbeOutcome, RecordEntry, RecordProbe, Registrar};
