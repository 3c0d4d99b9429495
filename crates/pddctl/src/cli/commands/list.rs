//! `pddctl DOMAIN list` - print every record of the domain.

use super::Context;
use crate::output::{CommandOutcome, format_entry};

pub async fn execute(ctx: &Context) -> CommandOutcome {
    match ctx
        .within_deadline(ctx.registrar.list_records(&ctx.domain))
        .await
    {
        Ok(records) => CommandOutcome::Listed(records.iter().map(format_entry).collect()),
        Err(e) => CommandOutcome::from_error(&e),
    }
}
