use clap::Parser;
use nozbe_org::ConvertError;
use nozbe_org::cli::{self, Cli};
use nozbe_org::logging::init_logging;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = cli::execute(&cli) {
        handle_error(&e);
    }
}

/// Print a fatal error (and a hint when one exists), then exit.
fn handle_error(err: &ConvertError) -> ! {
    tracing::error!("{err}");

    let use_color = io::stderr().is_terminal();
    if use_color {
        eprintln!("\x1b[31merror:\x1b[0m {err}");
    } else {
        eprintln!("error: {err}");
    }
    if let Some(hint) = err.suggestion() {
        eprintln!("hint: {hint}");
    }

    std::process::exit(err.exit_code());
}
