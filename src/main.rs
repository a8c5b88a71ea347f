use clap::Parser;
use tickgate::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
