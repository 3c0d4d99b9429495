//! `pddctl DOMAIN del` - delete a record by id.

use super::Context;
use crate::cli::args::DelArgs;
use crate::output::CommandOutcome;

pub async fn execute(ctx: &Context, args: &DelArgs) -> CommandOutcome {
    match ctx
        .within_deadline(ctx.registrar.delete_record(&ctx.domain, &args.id))
        .await
    {
        Ok(()) => CommandOutcome::Done,
        Err(e) => CommandOutcome::from_error(&e),
    }
}
