use clap::Parser;
use pinebt::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
