//! Contract test engine
//!
//! Loads YAML suites of ordered scenarios, runs them against the chat
//! service and checks each response against the scenario's expectations.
//! Expected rejections (400/401/403) are ordinary passing outcomes.

mod assert;
mod config;
mod environment;
mod report;
mod runner;
pub mod suite;

pub use assert::{check, evaluate, lookup, AssertionFailure, Evaluation, Extracted};
pub use config::*;
pub use environment::{Environment, RUN_ID_VAR};
pub use report::{print_result, Outcome, Report, ScenarioResult, Summary};
pub use runner::{RunOptions, Runner, ScenarioState};
