use std::process::ExitCode;

use beforeafter::{cli, logger};
use clap::Parser;

fn main() -> ExitCode {
    // Parse first so --help / --version don't truncate the previous session log
    let args = cli::CliArgs::parse();
    logger::init();
    cli::run(args)
}
