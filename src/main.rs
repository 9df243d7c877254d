use std::io;
use std::process::ExitCode;

use clap::Parser;

use uapi_cli::cli::Cli;
use uapi_cli::{commands, telemetry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    match uapi_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            commands::report_failure(&err, &mut io::stdout(), &mut io::stderr());
            ExitCode::FAILURE
        }
    }
}
