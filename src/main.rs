use clap::Parser;
use std::process::ExitCode;
use tabconv::cli::{run, Cli};

fn main() -> ExitCode {
    run(&Cli::parse())
}
