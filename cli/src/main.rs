use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod command;
mod util;
pub(crate) mod config;

use command::*;

const DEFAULT_LOG_FILTER: &str = "structgen=info,structgen_core=info";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one Go struct per table of the current database
    Generate(Generate),
}

fn main() -> Result<()> {
    use Command::*;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    match cli.command {
        Generate(g) => g.run(),
    }
}
