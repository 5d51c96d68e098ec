//! Test suite configuration types
//!
//! Defines the data structures for deserializing YAML test suites and the
//! structural checks a suite must pass before it can be run.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::common::{Error, Result};
use crate::http::HttpMethod;

/// A complete test suite loaded from a YAML file
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestSuite {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite verifies
    pub description: Option<String>,
    /// Variables available to every scenario as `{{name}}`
    ///
    /// Values may themselves reference the built-in `{{run_id}}`.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// The scenarios, executed in ascending `id` order
    pub scenarios: Vec<Scenario>,
}

/// One declarative test case: request shape plus expected outcome
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Ordering key, unique within the suite
    pub id: u32,
    /// Short identifier used in reports
    pub name: String,
    /// What the scenario verifies
    pub description: Option<String>,
    pub method: HttpMethod,
    /// Path template relative to the base URL, e.g. `/channel/{channelId}/org/{orgId}`
    pub path: String,
    /// Values for `{param}` placeholders in `path`
    #[serde(default)]
    pub path_params: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// JSON payload, serialized as the request body
    pub body: Option<serde_json::Value>,
    /// Credential subject whose bearer token must accompany the request
    pub auth: Option<String>,
    /// Scenarios whose side effects this one relies on
    #[serde(default)]
    pub depends_on: Vec<u32>,
    pub expect: Expectation,
    /// Values captured from the response for later scenarios
    #[serde(default)]
    pub extract: Vec<Extraction>,
}

/// Expected outcome of a scenario
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// Exact status code the service must answer with
    pub status: u16,
    /// Predicates over the parsed JSON body; all must hold
    #[serde(default)]
    pub body: Vec<BodyAssertion>,
}

/// A predicate over the parsed response body
///
/// Paths are dot-separated keys with numeric array indices
/// (`data.items.0.id`); an empty path or `$` is the document root.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum BodyAssertion {
    /// Field exists and is not null
    Present { path: String },
    /// Array at path has more than `threshold` elements
    LengthGreaterThan {
        #[serde(default)]
        path: String,
        threshold: usize,
    },
    /// Field equals a JSON literal
    Equals {
        path: String,
        value: serde_json::Value,
    },
}

/// A value captured from a successful response
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "into", rename_all = "snake_case")]
pub enum Extraction {
    /// Store a string field as the bearer token for `subject`
    Credential { path: String, subject: String },
    /// Store a scalar field as variable `name`
    Variable { path: String, name: String },
}

impl Scenario {
    /// Whether the scenario needs to parse the response body
    pub fn inspects_body(&self) -> bool {
        !self.expect.body.is_empty() || !self.extract.is_empty()
    }
}

impl TestSuite {
    /// Load and validate a suite from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a suite from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let suite: TestSuite =
            serde_yaml::from_str(content).map_err(|e| Error::SuiteParse(e.to_string()))?;
        suite.validate()?;
        Ok(suite)
    }

    /// Check the structural invariants the runner relies on
    ///
    /// Ids are unique, every dependency names a scenario with a smaller id
    /// (so it has already run), and expected status codes are real HTTP codes.
    pub fn validate(&self) -> Result<()> {
        if self.scenarios.is_empty() {
            return Err(Error::SuiteInvalid(format!(
                "suite '{}' has no scenarios",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.id) {
                return Err(Error::SuiteInvalid(format!(
                    "duplicate scenario id {}",
                    scenario.id
                )));
            }
        }

        for scenario in &self.scenarios {
            if !(100..=599).contains(&scenario.expect.status) {
                return Err(Error::SuiteInvalid(format!(
                    "scenario {} expects invalid status {}",
                    scenario.id, scenario.expect.status
                )));
            }

            if !scenario.path.starts_with('/') {
                return Err(Error::SuiteInvalid(format!(
                    "scenario {} path '{}' must start with '/'",
                    scenario.id, scenario.path
                )));
            }

            if scenario.auth.as_deref().is_some_and(|s| s.trim().is_empty()) {
                return Err(Error::SuiteInvalid(format!(
                    "scenario {} has an empty auth subject",
                    scenario.id
                )));
            }

            for dep in &scenario.depends_on {
                if !seen.contains(dep) {
                    return Err(Error::SuiteInvalid(format!(
                        "scenario {} depends on unknown scenario {}",
                        scenario.id, dep
                    )));
                }
                if *dep >= scenario.id {
                    return Err(Error::SuiteInvalid(format!(
                        "scenario {} depends on scenario {}, which does not run before it",
                        scenario.id, dep
                    )));
                }
            }
        }

        Ok(())
    }

    /// Scenarios in execution order
    pub fn ordered(&self) -> Vec<&Scenario> {
        let mut scenarios: Vec<&Scenario> = self.scenarios.iter().collect();
        scenarios.sort_by_key(|s| s.id);
        scenarios
    }
}
