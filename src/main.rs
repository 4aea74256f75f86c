//! `bootfiles` command-line entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use bootfiles_cli::cli::{self, Command};
use bootfiles_cli::commands;
use bootfiles_cli::logging::{self, Logger};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.name();
    let log_file = args.global.log_file.as_deref();

    logging::init_subscriber(args.verbose, command, log_file);
    let log = Arc::new(Logger::new(command, log_file));

    match &args.command {
        Command::Apply(opts) => commands::apply::run(&args.global, opts, &log),
        Command::Check(opts) => commands::check::run(&args.global, opts, &log),
        Command::Version => {
            commands::version::run(&*log);
            Ok(())
        }
    }
}
