//! CLI argument parsing

use crate::commands::{self, BumpArgs};
use clap::{Parser, Subcommand};

/// Doz CLI - release utilities for the Doz workspace
#[derive(Parser, Debug)]
#[command(name = "cargo-doz")]
#[command(bin_name = "cargo doz")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bump the version in Cargo.toml
    Bump(BumpArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Bump(args) => commands::bump(args),
        }
    }
}
