//! Response assertion engine
//!
//! Checks a response against a scenario's expectations. Mismatches are
//! returned as data so the runner can record them and move on.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::config::{BodyAssertion, Extraction, Scenario};

/// A single expectation that did not hold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssertionFailure {
    StatusMismatch {
        expected: u16,
        actual: u16,
    },
    InvalidJson {
        error: String,
    },
    Missing {
        path: String,
    },
    Null {
        path: String,
    },
    NotArray {
        path: String,
        found: &'static str,
    },
    TooShort {
        path: String,
        threshold: usize,
        actual: usize,
    },
    NotEqual {
        path: String,
        expected: Value,
        actual: Value,
    },
    NotExtractable {
        path: String,
        reason: String,
    },
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusMismatch { expected, actual } => {
                write!(f, "expected status {expected}, got {actual}")
            }
            Self::InvalidJson { error } => write!(f, "response body is not valid JSON: {error}"),
            Self::Missing { path } => write!(f, "field '{}' is missing", display_path(path)),
            Self::Null { path } => write!(f, "field '{}' is null", display_path(path)),
            Self::NotArray { path, found } => {
                write!(f, "'{}' is not an array (found {found})", display_path(path))
            }
            Self::TooShort {
                path,
                threshold,
                actual,
            } => write!(
                f,
                "expected more than {threshold} element(s) at '{}', found {actual}",
                display_path(path)
            ),
            Self::NotEqual {
                path,
                expected,
                actual,
            } => write!(
                f,
                "field '{}': expected {expected}, got {actual}",
                display_path(path)
            ),
            Self::NotExtractable { path, reason } => {
                write!(f, "cannot extract '{}': {reason}", display_path(path))
            }
        }
    }
}

/// A value captured from the response
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    /// Token for the (uninterpolated) subject template
    Credential { subject: String, token: String },
    Variable { name: String, value: String },
}

/// Outcome of checking one response
#[derive(Debug, Default)]
pub struct Evaluation {
    pub failures: Vec<AssertionFailure>,
    pub extracted: Vec<Extracted>,
}

impl Evaluation {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Check `status` and `body` against the scenario's expectations
///
/// The status must match exactly. Body predicates are evaluated
/// independently of each other and of the status. Extractions only run when
/// the status matched, since a token pulled from an error body is
/// meaningless.
pub fn evaluate(scenario: &Scenario, status: u16, body: &str) -> Evaluation {
    let mut evaluation = Evaluation::default();
    let status_matched = status == scenario.expect.status;

    if !status_matched {
        evaluation.failures.push(AssertionFailure::StatusMismatch {
            expected: scenario.expect.status,
            actual: status,
        });
    }

    if !scenario.inspects_body() {
        return evaluation;
    }

    let document: Value = match serde_json::from_str(body) {
        Ok(document) => document,
        Err(e) => {
            evaluation.failures.push(AssertionFailure::InvalidJson {
                error: e.to_string(),
            });
            return evaluation;
        }
    };

    for assertion in &scenario.expect.body {
        if let Some(failure) = check(assertion, &document) {
            evaluation.failures.push(failure);
        }
    }

    if status_matched {
        for extraction in &scenario.extract {
            match extract(extraction, &document) {
                Ok(value) => evaluation.extracted.push(value),
                Err(failure) => evaluation.failures.push(failure),
            }
        }
    }

    evaluation
}

/// Evaluate one body predicate, returning the failure if it does not hold
pub fn check(assertion: &BodyAssertion, document: &Value) -> Option<AssertionFailure> {
    match assertion {
        BodyAssertion::Present { path } => match lookup(document, path) {
            None => Some(AssertionFailure::Missing { path: path.clone() }),
            Some(Value::Null) => Some(AssertionFailure::Null { path: path.clone() }),
            Some(_) => None,
        },
        BodyAssertion::LengthGreaterThan { path, threshold } => match lookup(document, path) {
            None => Some(AssertionFailure::Missing { path: path.clone() }),
            Some(Value::Array(items)) if items.len() > *threshold => None,
            Some(Value::Array(items)) => Some(AssertionFailure::TooShort {
                path: path.clone(),
                threshold: *threshold,
                actual: items.len(),
            }),
            Some(other) => Some(AssertionFailure::NotArray {
                path: path.clone(),
                found: type_name(other),
            }),
        },
        BodyAssertion::Equals { path, value } => match lookup(document, path) {
            None => Some(AssertionFailure::Missing { path: path.clone() }),
            Some(actual) if actual == value => None,
            Some(actual) => Some(AssertionFailure::NotEqual {
                path: path.clone(),
                expected: value.clone(),
                actual: actual.clone(),
            }),
        },
    }
}

fn extract(extraction: &Extraction, document: &Value) -> Result<Extracted, AssertionFailure> {
    match extraction {
        Extraction::Credential { path, subject } => match lookup(document, path) {
            Some(Value::String(token)) if !token.trim().is_empty() => Ok(Extracted::Credential {
                subject: subject.clone(),
                token: token.clone(),
            }),
            Some(Value::String(_)) => Err(AssertionFailure::NotExtractable {
                path: path.clone(),
                reason: "token is empty".to_string(),
            }),
            Some(other) => Err(AssertionFailure::NotExtractable {
                path: path.clone(),
                reason: format!("token must be a string, found {}", type_name(other)),
            }),
            None => Err(AssertionFailure::Missing { path: path.clone() }),
        },
        Extraction::Variable { path, name } => {
            let value = match lookup(document, path) {
                Some(Value::String(s)) => s.clone(),
                Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
                Some(other) => {
                    return Err(AssertionFailure::NotExtractable {
                        path: path.clone(),
                        reason: format!("expected a scalar, found {}", type_name(other)),
                    })
                }
                None => return Err(AssertionFailure::Missing { path: path.clone() }),
            };
            Ok(Extracted::Variable {
                name: name.clone(),
                value,
            })
        }
    }
}

/// Resolve a dot path (`data.items.0.id`) inside a JSON document
///
/// An empty path or `$` is the root; a leading `$.` is accepted.
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(document);
    }

    path.split('.').try_fold(document, |current, key| match current {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Object(map) => map.get(key),
        _ => None,
    })
}

fn display_path(path: &str) -> &str {
    if path.trim().is_empty() {
        "$"
    } else {
        path
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
