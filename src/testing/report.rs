//! Run results and their presentation

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use super::assert::AssertionFailure;
use crate::common::{Error, Result};
use crate::http::HttpMethod;

/// Largest response snapshot kept on a result
const SNAPSHOT_LIMIT: usize = 2048;

/// Terminal state of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The service answered and every expectation held
    Passed,
    /// The service answered but an expectation did not hold
    Failed,
    /// No usable answer: connection, DNS or timeout. Also a request that
    /// cannot be built from the suite itself (unknown `{param}`, bad header)
    Errored,
    /// Not attempted: a dependency errored or was skipped, a credential was
    /// missing or expired, or a `{{var}}` an earlier scenario should have
    /// extracted is undefined
    DependencySkipped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Errored => "errored",
            Outcome::DependencySkipped => "skipped",
        };
        write!(f, "{label}")
    }
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub method: HttpMethod,
    pub path: String,
    pub outcome: Outcome,
    pub expected_status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<AssertionFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ScenarioResult {
    /// Keep at most [`SNAPSHOT_LIMIT`] bytes of a response body
    pub fn snapshot(body: &str) -> String {
        if body.len() <= SNAPSHOT_LIMIT {
            return body.to_string();
        }
        let mut end = SNAPSHOT_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} bytes total)", &body[..end], body.len())
    }
}

/// Per-outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

/// Aggregate of all results of a run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub suite: String,
    pub run_id: String,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Set when a credential error stopped the remaining scenarios
    pub aborted: bool,
    pub summary: Summary,
    pub results: Vec<ScenarioResult>,
}

impl Report {
    pub fn summarize(results: &[ScenarioResult]) -> Summary {
        let mut summary = Summary {
            total: results.len(),
            ..Summary::default()
        };
        for result in results {
            match result.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Errored => summary.errored += 1,
                Outcome::DependencySkipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// Whether every scenario passed
    pub fn all_passed(&self) -> bool {
        self.summary.total > 0 && self.summary.passed == self.summary.total
    }

    pub fn result(&self, id: u32) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to `path`, creating parent directories
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| Error::FileWrite {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Print the summary block that closes a run
    pub fn print_summary(&self) {
        let s = &self.summary;
        println!();
        if self.aborted {
            println!(
                "{}",
                "Run aborted: a required credential was missing or expired".yellow()
            );
        }

        let line = format!(
            "{} scenarios: {} passed, {} failed, {} errored, {} skipped ({} ms)",
            s.total, s.passed, s.failed, s.errored, s.skipped, self.duration_ms
        );
        if self.all_passed() {
            println!("{} {}\n", "✓".green().bold(), line.green().bold());
        } else {
            println!("{} {}\n", "✗".red().bold(), line.red().bold());
        }
    }
}

/// Print one result line (and its diagnostics) as the run progresses
pub fn print_result(result: &ScenarioResult, verbose: bool) {
    let label = format!(
        "[{}] {} {} {}",
        result.id, result.name, result.method, result.path
    );
    let latency = result
        .latency_ms
        .map(|ms| format!(" ({ms} ms)"))
        .unwrap_or_default();

    match result.outcome {
        Outcome::Passed => {
            let status = result.status.map(|s| s.to_string()).unwrap_or_default();
            println!(
                "  {} {} {}{}",
                "✓".green(),
                label,
                status.dimmed(),
                latency.dimmed()
            );
        }
        Outcome::Failed => {
            println!("  {} {}{}", "✗".red(), label, latency.dimmed());
            for failure in &result.failures {
                println!("      {}", failure.to_string().red());
            }
        }
        Outcome::Errored => {
            println!("  {} {}", "!".red().bold(), label);
            if let Some(error) = &result.error {
                println!("      {}", error.red());
            }
        }
        Outcome::DependencySkipped => {
            println!("  {} {}", "-".yellow(), label.dimmed());
            if let Some(error) = &result.error {
                println!("      {}", error.yellow());
            }
        }
    }

    let show_body = verbose || result.outcome == Outcome::Failed;
    if let (true, Some(body)) = (show_body, &result.response) {
        if !body.is_empty() {
            println!("      {} {}", "response:".dimmed(), body.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: u32, outcome: Outcome) -> ScenarioResult {
        ScenarioResult {
            id,
            name: format!("s{id}"),
            description: None,
            method: HttpMethod::Get,
            path: "/".to_string(),
            outcome,
            expected_status: 200,
            status: Some(200),
            failures: Vec::new(),
            error: None,
            latency_ms: Some(3),
            response: None,
        }
    }

    fn report(results: Vec<ScenarioResult>) -> Report {
        Report {
            suite: "t".to_string(),
            run_id: "r".to_string(),
            base_url: "http://localhost/".to_string(),
            started_at: Utc::now(),
            duration_ms: 10,
            aborted: false,
            summary: Report::summarize(&results),
            results,
        }
    }

    #[test]
    fn test_summary_counts() {
        let report = report(vec![
            result(1, Outcome::Passed),
            result(2, Outcome::Failed),
            result(3, Outcome::Errored),
            result(4, Outcome::DependencySkipped),
            result(5, Outcome::Passed),
        ]);
        assert_eq!(
            report.summary,
            Summary {
                total: 5,
                passed: 2,
                failed: 1,
                errored: 1,
                skipped: 1
            }
        );
        assert!(!report.all_passed());
        assert_eq!(report.result(3).unwrap().outcome, Outcome::Errored);
    }

    #[test]
    fn test_all_passed_requires_results() {
        assert!(!report(Vec::new()).all_passed());
        assert!(report(vec![result(1, Outcome::Passed)]).all_passed());
    }

    #[test]
    fn test_json_report_shape() {
        let mut failed = result(2, Outcome::Failed);
        failed.failures.push(AssertionFailure::StatusMismatch {
            expected: 200,
            actual: 500,
        });
        let json: serde_json::Value =
            serde_json::from_str(&report(vec![failed]).to_json().unwrap()).unwrap();

        assert_eq!(json["summary"]["failed"], 1);
        assert_eq!(json["results"][0]["outcome"], "failed");
        assert_eq!(json["results"][0]["method"], "GET");
        assert_eq!(json["results"][0]["failures"][0]["kind"], "status_mismatch");
        assert_eq!(json["results"][0]["failures"][0]["actual"], 500);
        assert!(json["results"][0].get("error").is_none());
    }

    #[test]
    fn test_write_json_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        report(vec![result(1, Outcome::Passed)]).write_json(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"passed\""));
    }

    #[test]
    fn test_write_json_failure_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        // The target is an existing directory, so the write itself fails
        let err = report(vec![result(1, Outcome::Passed)])
            .write_json(dir.path())
            .unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }), "{err:?}");
        assert!(err.to_string().starts_with("Failed to write file"));
    }

    #[test]
    fn test_snapshot_truncates_on_char_boundary() {
        let body = "é".repeat(SNAPSHOT_LIMIT);
        let snap = ScenarioResult::snapshot(&body);
        assert!(snap.ends_with(&format!("({} bytes total)", body.len())));
        assert_eq!(ScenarioResult::snapshot("short"), "short");
    }
}
