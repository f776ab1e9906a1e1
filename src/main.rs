//! dino-deploy CLI entrypoint.
//!
//! Reads `DINO_ENVIRONMENT` and `DINO_HOME`, runs the rolling deployment,
//! prints the outcome to stdout and exits 0 on success, 1 on failure.

use std::io::Write;
use std::process::ExitCode;

use dino_deploy::cli::{Cli, LogFormat, OutputFormatter};
use dino_deploy::config::load_dotenv;
use dino_deploy::deployer::{Deployer, DeploymentOutcome};
use dino_deploy::runner::{CommandRunner, DryRunRunner, SystemRunner};

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // .env may set RUST_LOG, so it is loaded before the filter is built
    let dotenv = load_dotenv(std::path::Path::new("."));

    // Initialize logging
    init_logging(cli.verbose, cli.log_format);

    let formatter = OutputFormatter::new(cli.output).with_details(cli.verbose || cli.dry_run);

    match dotenv {
        Ok(loaded) => debug!("Loaded .env: {loaded}"),
        Err(e) => {
            let outcome = DeploymentOutcome {
                report: None,
                error: Some(e),
            };
            return finish(&formatter, &outcome);
        }
    }

    let system = SystemRunner::new();
    let dry = DryRunRunner::new();
    let runner: &dyn CommandRunner = if cli.dry_run { &dry } else { &system };
    debug!("Dry run: {}", cli.dry_run);

    let outcome = Deployer::new(runner)
        .with_dry_run(cli.dry_run)
        .deploy(|name| std::env::var(name).ok());

    finish(&formatter, &outcome)
}

/// Initializes the logging system on stderr.
fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Prints the outcome to stdout and maps it to an exit code.
fn finish(formatter: &OutputFormatter, outcome: &DeploymentOutcome) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    if writeln!(stdout, "{}", formatter.format_outcome(outcome)).is_err() {
        return ExitCode::FAILURE;
    }
    outcome.exit_code()
}
