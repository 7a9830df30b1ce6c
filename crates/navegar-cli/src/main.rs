//! Navegador CLI: one browser action per invocation
//!
//! ## Usage
//!
//! ```bash
//! navegador navigate https://example.com
//! navegador click https://example.com "button.submit"
//! navegador screenshot https://example.com ./tmp/navegar/result.png
//! navegador handle-dialog https://example.com accept "My Input"
//! ```

use clap::error::ErrorKind;
use clap::Parser;
use navegador::{execute, report_error, Cli, CliResult, CommandPlan, GlobalOptions};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let kind = err.kind();
            let _ = err.print();
            // Help and version are not failures; everything else is a
            // usage error and exits 1.
            return if matches!(kind, ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let globals = GlobalOptions::from(&cli);
    let plan = CommandPlan::new(cli.command)?;
    execute(&plan, &globals)
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
