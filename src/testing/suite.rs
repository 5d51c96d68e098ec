//! Built-in chat service suite

use std::path::Path;

use super::config::TestSuite;
use crate::common::Result;

/// YAML source of the suite shipped with the binary
pub const CHAT_SERVICE_SUITE: &str = include_str!("../../suites/chat-service.yaml");

/// The chat service contract suite
pub fn builtin() -> Result<TestSuite> {
    TestSuite::from_yaml_str(CHAT_SERVICE_SUITE)
}

/// Load the suite at `path`, or the built-in one
pub fn load(path: Option<&Path>) -> Result<TestSuite> {
    match path {
        Some(path) => TestSuite::load(path),
        None => builtin(),
    }
}
