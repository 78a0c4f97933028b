//! `compile` binary: parse arguments, set up logging and dispatch one verb.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use compile_cli::cli::Cli;
use compile_cli::commands::{self, Command, Context};
use compile_cli::error::CommandError;
use compile_cli::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let command = args.command.to_command();

    logging::init_subscriber(args.verbose, command.name());
    let log = Arc::new(Logger::new(command.name()));

    // A bad verb is reported before the project root is resolved.
    if let Command::Unknown(verb) = &command {
        log.error(&CommandError::Unknown(verb.clone()).to_string());
        return Ok(());
    }

    let result =
        Context::init(&args.global, log.clone()).and_then(|ctx| commands::dispatch(&command, &ctx));
    log.print_summary();
    result.map(drop)
}
