//! `wemvoice` command-line interface

pub mod commands;
pub mod progress;

use clap::{ArgAction, Parser};
use commands::Commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wemvoice", version)]
#[command(about = "Match voice assets to Wwise txtp descriptors and copy them to <id>.wem")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Log level for a `--verbose` count. Warnings are always shown.
fn log_level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// Run the `wemvoice` CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `--json` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level(cli.verbose).into()))
        .with_writer(std::io::stderr)
        .init();

    cli.command.execute()
}
