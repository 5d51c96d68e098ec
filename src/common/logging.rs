//! Logging and tracing configuration
//!
//! Scenario progress goes to stdout through the report printer; tracing
//! output goes to stderr and, optionally, to a log file.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate (DEBUG with `verbose`), WARN for dependencies.
///
/// When `log_file` is given, a second layer appends full-detail records to
/// that file. The returned guard must be held until the run ends so the
/// non-blocking writer flushes.
pub fn init_cli(verbose: bool, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("chat_contract=debug,warn")
        } else {
            EnvFilter::new("chat_contract=info,warn")
        }
    });

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return None;
    };

    let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = path.file_name().map(|n| n.to_os_string());

    match (directory.map(Path::to_path_buf).unwrap_or_else(|| ".".into()), file_name) {
        (dir, Some(name)) if std::fs::create_dir_all(&dir).is_ok() => {
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();

            Some(guard)
        }
        _ => {
            eprintln!(
                "Warning: Could not open log file '{}', logging to stderr only",
                path.display()
            );
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}
