//! Error types for the contract suite
//!
//! Only setup problems (configuration, suite files, templates) are errors.
//! Assertion mismatches, transport failures and credential problems are
//! recorded on scenario results and never abort a run.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the contract suite
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    // === Suite Errors ===
    #[error("Failed to parse test suite: {0}")]
    SuiteParse(String),

    #[error("Invalid test suite: {0}")]
    SuiteInvalid(String),

    #[error("{failed} of {total} scenarios did not pass")]
    SuiteFailed { failed: usize, total: usize },

    #[error("Scenario {id} references undefined {kind} '{name}'")]
    UndefinedPlaceholder {
        id: u32,
        kind: &'static str,
        name: String,
    },

    // === Credential Errors ===
    #[error("No credential stored for '{0}'. Run a login scenario first or configure a static credential")]
    CredentialMissing(String),

    #[error("Credential for '{subject}' expired at {expired_at}")]
    CredentialExpired { subject: String, expired_at: String },

    // === HTTP Errors ===
    #[error("Invalid request for scenario {id}: {reason}")]
    InvalidRequest { id: u32, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an undefined variable error for a scenario
    pub fn undefined_variable(id: u32, name: &str) -> Self {
        Self::UndefinedPlaceholder {
            id,
            kind: "variable",
            name: name.to_string(),
        }
    }

    /// Create an undefined path parameter error for a scenario
    pub fn undefined_path_param(id: u32, name: &str) -> Self {
        Self::UndefinedPlaceholder {
            id,
            kind: "path parameter",
            name: name.to_string(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(id: u32, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            id,
            reason: reason.into(),
        }
    }

    /// Whether this error comes from the credential store
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::CredentialMissing(_) | Self::CredentialExpired { .. }
        )
    }
}
