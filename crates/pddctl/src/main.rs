// # pddctl - PDD DNS record tool
//
// Thin integration layer over `pdd-core` and `pdd-registrar-yandex`:
//
// 1. Parse arguments (usage errors exit with clap's status)
// 2. Initialize logging on stderr
// 3. Run one command under the overall deadline
// 4. Print `OK`, `ERROR: <message>` or the record listing on stdout
//
// No record or propagation logic lives here.
//
// ## Example
//
// ```bash
// export YANDEX_PDD_TOKEN=your_token
//
// pddctl --ttl 60 --sync test.ru add sub A 127.0.0.1
// pddctl test.ru list
// ```

mod cli;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use cli::args::Cli;
use output::{CommandOutcome, PddctlExitCode};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PddctlExitCode::Failure.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            let outcome = CommandOutcome::Failed(e.to_string());
            outcome.report();
            return outcome.exit_code().into();
        }
    };

    let outcome = rt.block_on(cli::run(cli));
    outcome.report();
    outcome.exit_code().into()
}
