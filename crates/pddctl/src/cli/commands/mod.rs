//! Command implementations.

pub mod add;
pub mod del;
pub mod list;

use pdd_core::{Cancellation, Error, Registrar, VerificationConfig};
use std::future::Future;
use std::sync::Arc;

/// Shared context for all commands.
#[derive(Clone)]
pub struct Context {
    /// Domain whose records are managed
    pub domain: String,

    /// Registrar API client
    pub registrar: Arc<dyn Registrar>,

    /// Overall deadline of the command, shared by every step
    pub cancel: Cancellation,

    /// TTL for added records
    pub ttl: Option<u32>,

    /// Propagation settings when `--sync` is given
    pub sync: Option<VerificationConfig>,
}

impl Context {
    /// Run a registrar call under the command deadline
    ///
    /// The call is abandoned with `Error::Timeout` once the deadline passes.
    pub async fn within_deadline<T>(
        &self,
        call: impl Future<Output = pdd_core::Result<T>>,
    ) -> pdd_core::Result<T> {
        tokio::select! {
            result = call => result,
            _ = self.cancel.cancelled() => Err(Error::Timeout),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("domain", &self.domain)
            .field("registrar", &self.registrar.registrar_name())
            .field("ttl", &self.ttl)
            .field("sync", &self.sync.is_some())
            .finish()
    }
}
