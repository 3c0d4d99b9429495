//! Core traits for the PDD DNS system
//!
//! This module defines the abstract interfaces that implementations follow.
//!
//! - [`RecordProbe`]: Ask one authoritative server whether a record is live
//! - [`Registrar`]: Create, delete and list records via a registrar API

pub mod probe;
pub mod registrar;

pub use probe::{ProbeOutcome, RecordProbe};
pub use registrar::{NewRecord, RecordEntry, Registrar};
