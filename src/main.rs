//! Chat service contract suite
//!
//! Runs ordered HTTP scenarios against the chat service and reports, per
//! scenario, whether the documented status code and response shape held.

use clap::Parser;
use chat_contract::cli::{self, GlobalOptions};
use chat_contract::commands::Commands;
use chat_contract::common::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chat-contract", about = "Contract tests for the chat service API")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_guard = logging::init_cli(cli.verbose, cli.log_file.as_deref());

    let global = GlobalOptions {
        config: cli.config,
        verbose: cli.verbose,
    };

    let result = cli::dispatch(cli.command, global).await;

    // Flush the file writer; process::exit skips destructors
    drop(log_guard);

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
