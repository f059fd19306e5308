#![allow(clippy::print_stderr)]

use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;

use typesub_cli::args::CliArgs;
use typesub_cli::commands::run_command;

/// `check` answered yes, or a query command succeeded.
const EXIT_SUCCESS: u8 = 0;
/// `check` answered no (or `unknown` under the strict policy).
const EXIT_NOT_SUBTYPE: u8 = 1;
/// Invalid input: bad expression, unreadable config, cyclic class.
const EXIT_INVALID_INPUT: u8 = 2;

fn main() -> ExitCode {
    // Initialize tracing if TYPESUB_LOG or RUST_LOG is set.
    typesub_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    if args.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let report = match run_command(&args.command) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    };

    match report.render(args.format) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }

    if report.succeeded() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_NOT_SUBTYPE)
    }
}
