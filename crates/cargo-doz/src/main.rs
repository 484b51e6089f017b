use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    // cargo passes the subcommand name as the first argument
    let args = std::env::args().enumerate().filter_map(|(i, arg)| {
        if i == 1 && arg == "doz" {
            None
        } else {
            Some(arg)
        }
    });

    Cli::parse_from(args).execute()
}
