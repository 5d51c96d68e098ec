//! Configuration file handling

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use url::Url;

use super::paths::config_path;
use super::{Error, Result};

/// Endpoint used when neither the CLI, the environment nor the config file names one
pub const DEFAULT_BASE_URL: &str = "https://chat-service-s5g2.onrender.com";

/// Environment variable overriding the configured base URL
pub const BASE_URL_ENV: &str = "CHAT_CONTRACT_BASE_URL";

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Base endpoint of the chat service
    #[serde(default)]
    pub base_url: Option<String>,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Credential lifetime and out-of-band tokens
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Fixture identity used instead of a per-run one
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Runner behavior
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Upper bound for a single request, including reading the body
    #[serde(default = "default_request")]
    pub request_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: default_request(),
        }
    }
}

fn default_request() -> u64 {
    30
}

/// Credential settings
#[derive(Debug, Deserialize)]
pub struct CredentialsConfig {
    /// Lifetime assumed for tokens whose expiry cannot be read from the token itself
    #[serde(default = "default_ttl")]
    pub default_ttl_secs: u64,

    /// Tokens supplied out-of-band, loaded into the store before the run
    #[serde(default, rename = "static")]
    pub static_credentials: Vec<StaticCredential>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl(),
            static_credentials: Vec::new(),
        }
    }
}

fn default_ttl() -> u64 {
    3600
}

/// A token supplied in the config file
#[derive(Debug, Deserialize, Clone)]
pub struct StaticCredential {
    /// Subject the token belongs to (usually an email)
    pub subject: String,
    /// Bearer token value
    pub token: String,
    /// When the token was issued (defaults to load time)
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
    /// When the token stops being usable
    pub expires_at: DateTime<Utc>,
}

/// Identity settings
#[derive(Debug, Deserialize, Default)]
pub struct IdentityConfig {
    /// Fixed account email. When unset, each run signs up a fresh identity.
    #[serde(default)]
    pub email: Option<String>,

    /// Password for the account
    #[serde(default)]
    pub password: Option<String>,
}

/// Runner settings
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    /// Skip every remaining scenario once a credential is missing or expired
    #[serde(default = "default_abort")]
    pub abort_on_credential_error: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            abort_on_credential_error: default_abort(),
        }
    }
}

fn default_abort() -> bool {
    true
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Resolve the base endpoint for this run
    ///
    /// Precedence: CLI flag, then `CHAT_CONTRACT_BASE_URL`, then the config
    /// file, then [`DEFAULT_BASE_URL`].
    pub fn resolve_base_url(&self, cli: Option<&str>) -> Result<Url> {
        let from_env = std::env::var(BASE_URL_ENV).ok();
        self.resolve_base_url_with(cli, from_env.as_deref())
    }

    fn resolve_base_url_with(&self, cli: Option<&str>, env: Option<&str>) -> Result<Url> {
        let raw = cli
            .or(env.filter(|v| !v.trim().is_empty()))
            .or(self.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim();

        parse_base_url(raw)
    }
}

/// Parse and sanity-check a base endpoint
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }

    Ok(url)
}
