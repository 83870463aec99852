use std::process::ExitCode;

use clap::Parser;
use siren_runner::{main_with, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match main_with(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
