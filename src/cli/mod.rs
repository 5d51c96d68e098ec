//! CLI command handling
//!
//! Dispatches CLI commands to the runner and formats output.

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::credentials::CredentialStore;
use crate::http::ReqwestTransport;
use crate::testing::{suite, Environment, RunOptions, Runner, TestSuite};

/// Settings that apply to every command
#[derive(Debug, Default)]
pub struct GlobalOptions {
    /// Explicit config file instead of the platform default
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, global: GlobalOptions) -> Result<()> {
    match command {
        Commands::Run {
            suite,
            base_url,
            fixed_identity,
            password,
            timeout,
            continue_on_credential_error,
            json,
            report: report_path,
        } => {
            let config = load_config(global.config.as_deref())?;
            let suite = suite::load(suite.as_deref())?;

            let base_url = config.resolve_base_url(base_url.as_deref())?;
            let credentials = CredentialStore::with_static(&config.credentials.static_credentials);
            let mut env = Environment::new(base_url, credentials);

            if let Some(email) = fixed_identity.or_else(|| config.identity.email.clone()) {
                tracing::info!(%email, "Using fixture identity");
                env.set_variable("email", &email);
            }
            if let Some(password) = password.or_else(|| config.identity.password.clone()) {
                env.set_variable("password", &password);
            }
            env.load_suite_variables(&suite)?;

            let timeout = Duration::from_secs(timeout.unwrap_or(config.timeouts.request_secs));
            let transport = ReqwestTransport::new(timeout)?;
            let options = RunOptions {
                abort_on_credential_error: config.runner.abort_on_credential_error
                    && !continue_on_credential_error,
                default_ttl: chrono::Duration::seconds(
                    config.credentials.default_ttl_secs.min(u64::from(u32::MAX)) as i64,
                ),
                print_progress: !json,
                verbose: global.verbose,
            };

            let mut runner = Runner::new(transport, options);
            let report = runner.run(&suite, &mut env).await;

            if json {
                println!("{}", report.to_json()?);
            } else {
                report.print_summary();
            }

            if let Some(path) = report_path {
                let path = match path {
                    Some(path) => path,
                    None => default_report_path(report.run_id.as_str())?,
                };
                report.write_json(&path)?;
                if !json {
                    println!("Report written to {}", path.display());
                }
            }

            if report.all_passed() {
                Ok(())
            } else {
                Err(Error::SuiteFailed {
                    failed: report.summary.total - report.summary.passed,
                    total: report.summary.total,
                })
            }
        }

        Commands::List { suite } => {
            let suite = suite::load(suite.as_deref())?;
            print_scenarios(&suite);
            Ok(())
        }

        Commands::Validate { path } => {
            let suite = TestSuite::load(&path)?;
            println!(
                "{} Suite '{}' is valid ({} scenarios)",
                "✓".green(),
                suite.name,
                suite.scenarios.len()
            );
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn default_report_path(run_id: &str) -> Result<PathBuf> {
    let dir = paths::ensure_reports_dir()?.ok_or_else(|| {
        Error::Config("Could not determine the reports directory; pass --report FILE".to_string())
    })?;
    Ok(dir.join(format!("report-{run_id}.json")))
}

fn print_scenarios(suite: &TestSuite) {
    println!("{}", suite.name.bold());
    if let Some(desc) = &suite.description {
        println!("  {}", desc.dimmed());
    }
    println!();

    for scenario in suite.ordered() {
        let mut line = format!(
            "  [{:>2}] {:<32} {:<6} {:<36} -> {}",
            scenario.id,
            scenario.name,
            scenario.method.to_string(),
            scenario.path,
            scenario.expect.status
        );
        if let Some(subject) = &scenario.auth {
            line.push_str(&format!("  auth: {subject}"));
        }
        if !scenario.depends_on.is_empty() {
            let deps: Vec<String> = scenario.depends_on.iter().map(u32::to_string).collect();
            line.push_str(&format!("  after: {}", deps.join(", ")));
        }
        println!("{line}");
    }
}
