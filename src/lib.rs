//! Chat service contract suite
//!
//! This library provides the scenario model, request builder, credential
//! store, assertion engine and runner behind the `chat-contract` CLI.

pub mod cli;
pub mod commands;
pub mod common;
pub mod credentials;
pub mod http;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use credentials::{Credential, CredentialStore};
pub use testing::{Environment, Outcome, Report, RunOptions, Runner, TestSuite};
