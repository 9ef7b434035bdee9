use clap::{Parser, Subcommand};

use std::path::PathBuf;

#[derive(Parser)]
pub struct CLI {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Compile the given source file to an object file")]
    Compile { file_path: PathBuf },
}
