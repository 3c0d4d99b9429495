//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use args::{Cli, Commands};
use pdd_core::{Cancellation, Registrar, VerificationConfig};
use pdd_registrar_yandex::YandexPddRegistrar;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::output::CommandOutcome;

/// Upper bound for a single DNS exchange phase while syncing
const MAX_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Lower bound for a single DNS exchange phase while syncing
const MIN_PROBE_TIMEOUT: Duration = Duration::from_millis(100);

/// Run one command to completion
///
/// The overall deadline starts here, so it covers the registrar call and
/// the propagation wait alike.
pub async fn run(cli: Cli) -> CommandOutcome {
    let cancel = match cli.overall_timeout() {
        Some(timeout) => Cancellation::with_timeout(timeout).0,
        None => Cancellation::never(),
    };

    let Some(token) = cli.resolve_token(|name| std::env::var(name).ok()) else {
        return CommandOutcome::Failed(format!(
            "Token required: pass --token or set {}",
            cli.tokenenv
        ));
    };

    let registrar = match YandexPddRegistrar::new(token) {
        Ok(registrar) => Arc::new(registrar),
        Err(e) => return CommandOutcome::from_error(&e),
    };

    let sync = cli
        .sync
        .then(|| sync_config(&cli, registrar.authoritative_servers()));

    let ctx = commands::Context {
        domain: cli.domain.clone(),
        registrar,
        cancel,
        ttl: cli.record_ttl(),
        sync,
    };
    debug!(?ctx, "Running command");

    match &cli.command {
        Commands::Add(args) => commands::add::execute(&ctx, args).await,
        Commands::Del(args) => commands::del::execute(&ctx, args).await,
        Commands::List => commands::list::execute(&ctx).await,
    }
}

/// Propagation settings for `--sync`
///
/// Probe timeouts stay below the check interval so a slow server cannot
/// stretch a check past the next one.
pub fn sync_config(cli: &Cli, servers: Vec<String>) -> VerificationConfig {
    let interval = cli.check_interval();
    let probe_timeout = (interval / 2).clamp(MIN_PROBE_TIMEOUT, MAX_PROBE_TIMEOUT);

    VerificationConfig::new(servers)
        .with_transport(cli.dns_network)
        .with_attempts_per_check(cli.request_times)
        .with_poll_interval(interval)
        .with_probe_timeout(probe_timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pdd_core::Transport;

    #[test]
    fn sync_config_follows_flags() {
        let cli = Cli::parse_from([
            "pddctl",
            "--check-interval",
            "5",
            "--request-times",
            "3",
            "--dns-network",
            "udp",
            "example.com",
            "list",
        ]);

        let config = sync_config(&cli, vec!["dns1.yandex.ru:53".to_string()]);

        assert_eq!(config.servers, vec!["dns1.yandex.ru:53"]);
        assert_eq!(config.transport, Transport::Udp);
        assert_eq!(config.attempts_per_check, 3);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.probe_timeouts().read, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn probe_timeout_stays_below_default_interval() {
        let cli = Cli::parse_from(["pddctl", "example.com", "list"]);
        let config = sync_config(&cli, vec!["dns1.yandex.ru:53".to_string()]);

        assert_eq!(config.probe_timeouts().dial, Duration::from_millis(500));
        assert!(config.probe_timeouts().dial < config.poll_interval());
    }

    #[test]
    fn zero_request_times_is_rejected_by_validation() {
        let cli = Cli::parse_from(["pddctl", "--request-times", "0", "example.com", "list"]);
        let config = sync_config(&cli, vec!["dns1.yandex.ru:53".to_string()]);
        assert!(config.validate().is_err());
    }
}
