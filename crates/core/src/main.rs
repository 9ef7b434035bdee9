mod cli;
mod runner;

use crate::cli::{Command, CLI};

use clap::Parser;

use std::io;

fn main() -> io::Result<()> {
    let cli = CLI::parse();

    match &cli.command {
        Command::Compile { file_path } => runner::compile_file(file_path),
    }
}
