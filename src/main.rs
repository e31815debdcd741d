use clap::Parser;
use stockdeck::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
