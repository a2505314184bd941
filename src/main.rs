//! fbprog - Fastboot flashing toolbox
//!
//! Entry point for the fbprog command-line application.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use fbprog::cli::output::display_error;
use fbprog::cli::{Cli, Invocation};

/// Log level selected by `--quiet` and `--verbose`
fn log_level(cli: &Cli) -> Level {
    match (cli.quiet, cli.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    }
}

fn main() {
    let invocation = match Invocation::try_parse_from(std::env::args()) {
        Ok(invocation) => invocation,
        Err(e) => e.exit(),
    };

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(log_level(&invocation.cli).into()),
        )
        .init();

    if let Err(e) = invocation.run() {
        display_error(&e);
        std::process::exit(1);
    }
}
