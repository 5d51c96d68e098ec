//! Per-run environment
//!
//! Everything a run shares between scenarios lives here and is passed to the
//! runner explicitly: the base endpoint, the credential store and the
//! variables scenarios interpolate and extract.

use std::collections::HashMap;

use url::Url;
use uuid::Uuid;

use super::config::TestSuite;
use crate::common::{interpolate, Error, Result};
use crate::credentials::CredentialStore;

/// Built-in variable holding the per-run identifier
pub const RUN_ID_VAR: &str = "run_id";

/// State shared by all scenarios of one run
#[derive(Debug)]
pub struct Environment {
    pub base_url: Url,
    pub credentials: CredentialStore,
    run_id: String,
    variables: HashMap<String, String>,
}

impl Environment {
    /// Create an environment with a fresh run id
    pub fn new(base_url: Url, credentials: CredentialStore) -> Self {
        let run_id = Uuid::new_v4().simple().to_string()[..12].to_string();
        Self::with_run_id(base_url, credentials, run_id)
    }

    /// Create an environment with a caller-chosen run id
    pub fn with_run_id(base_url: Url, credentials: CredentialStore, run_id: String) -> Self {
        let mut variables = HashMap::new();
        variables.insert(RUN_ID_VAR.to_string(), run_id.clone());
        Self {
            base_url,
            credentials,
            run_id,
            variables,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Resolve the suite's variables and add them to the environment
    ///
    /// Values already set (overrides such as a fixture identity) win over
    /// the suite's defaults.
    pub fn load_suite_variables(&mut self, suite: &TestSuite) -> Result<()> {
        for (name, template) in &suite.variables {
            if self.variables.contains_key(name) {
                continue;
            }
            let value = self.resolve(template).map_err(|_| {
                Error::SuiteInvalid(format!(
                    "variable '{name}' references an undefined variable in '{template}'"
                ))
            })?;
            self.variables.insert(name.clone(), value);
        }
        Ok(())
    }

    pub fn set_variable(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// Interpolate `{{name}}` placeholders against the current variables
    pub fn resolve(&self, text: &str) -> std::result::Result<String, String> {
        interpolate(text, |name| self.variable(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::with_run_id(
            Url::parse("http://localhost").unwrap(),
            CredentialStore::new(),
            "abc123".to_string(),
        )
    }

    fn suite(variables: &str) -> TestSuite {
        TestSuite::from_yaml_str(&format!(
            "name: s\nvariables: {variables}\nscenarios:\n  - {{ id: 1, name: a, method: GET, path: /, expect: {{ status: 200 }} }}\n"
        ))
        .unwrap()
    }

    #[test]
    fn test_run_id_is_available() {
        let env = Environment::new(Url::parse("http://localhost").unwrap(), CredentialStore::new());
        assert_eq!(env.run_id().len(), 12);
        assert_eq!(env.variable(RUN_ID_VAR), Some(env.run_id()));
    }

    #[test]
    fn test_suite_variables_resolve_run_id() {
        let mut env = env();
        env.load_suite_variables(&suite(r#"{ email: "qa-{{run_id}}@example.com" }"#))
            .unwrap();
        assert_eq!(env.variable("email"), Some("qa-abc123@example.com"));
    }

    #[test]
    fn test_overrides_win_over_suite_defaults() {
        let mut env = env();
        env.set_variable("email", "a@x.com");
        env.load_suite_variables(&suite(r#"{ email: "qa-{{run_id}}@example.com" }"#))
            .unwrap();
        assert_eq!(env.variable("email"), Some("a@x.com"));
    }

    #[test]
    fn test_undefined_reference_in_suite_variable() {
        let mut env = env();
        let err = env
            .load_suite_variables(&suite(r#"{ email: "{{nope}}@x.com" }"#))
            .unwrap_err();
        assert!(matches!(err, Error::SuiteInvalid(_)));
    }
}
