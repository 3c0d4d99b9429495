//! `pddctl DOMAIN add` - create a record, optionally wait for propagation.

use anyhow::{Context as _, Result, bail};
use pdd_core::{NewRecord, PropagationEngine, VerificationVerdict};
use tracing::{info, warn};

use super::Context;
use crate::cli::args::AddArgs;
use crate::output::CommandOutcome;

pub async fn execute(ctx: &Context, args: &AddArgs) -> CommandOutcome {
    let record = match parse_record(args) {
        Ok(record) => record.with_ttl(ctx.ttl),
        Err(e) => return CommandOutcome::Failed(e.to_string()),
    };

    if let Err(e) = ctx
        .within_deadline(ctx.registrar.add_record(&ctx.domain, &record))
        .await
    {
        return CommandOutcome::from_error(&e);
    }

    let Some(config) = ctx.sync.clone() else {
        return CommandOutcome::Done;
    };

    let engine = match PropagationEngine::with_dns_probe(config) {
        Ok(engine) => engine,
        Err(e) => return CommandOutcome::from_error(&e),
    };

    let fingerprint = record.fingerprint(&ctx.domain);
    info!(
        record = %fingerprint,
        servers = engine.endpoints().len(),
        "Waiting for propagation"
    );

    match engine.poll_until_propagated(&fingerprint, &ctx.cancel).await {
        VerificationVerdict::Propagated => CommandOutcome::Done,
        VerificationVerdict::TimedOut => {
            warn!(record = %fingerprint, "Record added but not confirmed in time");
            CommandOutcome::from_error(&pdd_core::Error::Timeout)
        }
    }
}

/// Build the record from `SUBDOMAIN TYPE [PRIORITY] [WEIGHT] [PORT] VALUE`
///
/// MX takes exactly one number before the value, SRV exactly three, every
/// other type none.
pub fn parse_record(args: &AddArgs) -> Result<NewRecord> {
    let record_type = args.record_type.trim().to_ascii_uppercase();
    let values: Vec<&str> = args.values.iter().map(String::as_str).collect();

    let record = match (record_type.as_str(), values.as_slice()) {
        ("MX", [priority, exchange]) => {
            NewRecord::mx(&args.subdomain, parse_number("priority", priority)?, *exchange)
        }
        ("MX", _) => {
            bail!("MX record needs 4 arguments: subdomain, type, priority, value")
        }
        ("SRV", [priority, weight, port, target]) => NewRecord::srv(
            &args.subdomain,
            parse_number("priority", priority)?,
            parse_number("weight", weight)?,
            parse_number("port", port)?,
            *target,
        ),
        ("SRV", _) => {
            bail!("SRV record needs 6 arguments: subdomain, type, priority, weight, port, target")
        }
        (_, [content]) => NewRecord::new(&args.subdomain, &record_type, *content),
        _ => bail!("Need 3 arguments: subdomain, type, value"),
    };

    Ok(record)
}

fn parse_number(field: &str, value: &str) -> Result<u16> {
    value
        .parse()
        .with_context(|| format!("Invalid {} '{}': expected a number from 0 to 65535", field, value))
}
