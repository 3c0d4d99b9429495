//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use pdd_core::Transport;
use std::time::Duration;

/// Manage DNS records of a domain hosted at Yandex PDD
///
/// Optionally waits until an added record is served by every Yandex
/// authoritative name server.
///
/// Examples:
///
///   pddctl --ttl 60 test.ru add sub A 127.0.0.1
///   pddctl --sync test.ru add _acme-challenge TXT token
///   pddctl test.ru add @ MX 10 mx.test.ru.
///   pddctl test.ru add _sip._tcp SRV 10 60 5060 sip.test.ru.
///   pddctl test.ru list
///   pddctl test.ru del 123456
#[derive(Parser, Debug)]
#[command(name = "pddctl")]
#[command(author, version, about)]
pub struct Cli {
    /// PDD admin token (default: read from the variable named by --tokenenv)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Environment variable holding the token when --token is not given
    #[arg(long, global = true, default_value = "YANDEX_PDD_TOKEN")]
    pub tokenenv: String,

    /// TTL in seconds for added records (0 = registrar default)
    #[arg(long, global = true, default_value_t = 0)]
    pub ttl: u32,

    /// Time limit for the whole command in seconds (0 = no limit)
    #[arg(long, global = true, default_value_t = 60)]
    pub timeout: u64,

    /// After `add`, wait until the record is served by every name server
    #[arg(long, global = true)]
    pub sync: bool,

    /// Seconds between propagation checks
    #[arg(long = "check-interval", global = true, default_value_t = 1)]
    pub check_interval: u64,

    /// Consecutive successful rounds required to consider a record propagated
    #[arg(long = "request-times", global = true, default_value_t = 10)]
    pub request_times: usize,

    /// Transport used to query the name servers (tcp or udp)
    #[arg(long = "dns-network", global = true, default_value = "tcp")]
    pub dns_network: Transport,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", global = true, env = "PDD_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Domain whose records are managed
    pub domain: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Token from `--token`, or from the environment variable named by `--tokenenv`
    ///
    /// Empty values count as missing.
    pub fn resolve_token(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.token
            .clone()
            .or_else(|| lookup(&self.tokenenv))
            .filter(|token| !token.trim().is_empty())
    }

    /// TTL to send with added records
    pub fn record_ttl(&self) -> Option<u32> {
        (self.ttl != 0).then_some(self.ttl)
    }

    /// Overall command time limit
    pub fn overall_timeout(&self) -> Option<Duration> {
        (self.timeout != 0).then(|| Duration::from_secs(self.timeout))
    }

    /// Pause between propagation checks
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a record: SUBDOMAIN TYPE [PRIORITY] [WEIGHT] [PORT] VALUE
    ///
    /// MX takes a priority, SRV takes priority, weight and port.
    Add(AddArgs),

    /// Delete the record with the given id (see `list`)
    Del(DelArgs),

    /// List records as: ID SUBDOMAIN TYPE TTL [PRIORITY] CONTENT
    List,
}

// ============================================================================
// Add command
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Subdomain (`@` for the domain itself)
    pub subdomain: String,

    /// Record type (A, AAAA, CNAME, MX, NS, SRV, TXT, ...)
    pub record_type: String,

    /// [PRIORITY] [WEIGHT] [PORT] VALUE
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub values: Vec<String>,
}

// ============================================================================
// Del command
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct DelArgs {
    /// Record id
    pub id: String,
}
