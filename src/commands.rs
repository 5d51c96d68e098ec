//! CLI command definitions
//!
//! Defines the clap commands for the contract suite CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a contract suite against the chat service
    Run {
        /// YAML suite file (default: the built-in chat service suite)
        #[arg(long)]
        suite: Option<PathBuf>,

        /// Base URL of the service (overrides CHAT_CONTRACT_BASE_URL and the config file)
        #[arg(long)]
        base_url: Option<String>,

        /// Use a fixture account instead of signing up a fresh identity for this run
        #[arg(long, value_name = "EMAIL")]
        fixed_identity: Option<String>,

        /// Password for the fixture account
        #[arg(long, requires = "fixed_identity")]
        password: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Keep running after a credential is missing or expired, skipping
        /// only the scenarios that need it
        #[arg(long)]
        continue_on_credential_error: bool,

        /// Print the report as JSON instead of progress lines
        #[arg(long)]
        json: bool,

        /// Write the JSON report to FILE (default: the reports directory)
        #[arg(long, value_name = "FILE", num_args = 0..=1)]
        report: Option<Option<PathBuf>>,
    },

    /// List scenarios in execution order
    #[command(alias = "ls")]
    List {
        /// YAML suite file (default: the built-in chat service suite)
        #[arg(long)]
        suite: Option<PathBuf>,
    },

    /// Check that a suite file parses and its ordering is consistent
    Validate {
        /// Path to the YAML suite file
        path: PathBuf,
    },
}
