// External crates
use anyhow::{Context, Result};
use std::panic;
use std::path::Path;
use tracing::error;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_error::ErrorLayer;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*, registry::Registry};

/// Log file name prefix inside `--log-dir`
const LOG_FILE_NAME: &str = "sumocli.log";

/// Keeps the non-blocking writers flushing until dropped at the end of `main`
#[derive(Debug)]
pub struct TracingGuards {
    _stderr: WorkerGuard,
    _file: Option<WorkerGuard>,
}

/// Default filter directive for a `-v` verbosity level
pub fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<TracingGuards> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_directive(verbose)));

    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());

    let fmt_layer = fmt::layer()
        .with_ansi(true)
        .with_writer(stderr_writer)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let (json_layer, file_guard) = match log_dir {
        Some(dir) => {
            let file_appender = rolling::daily(dir, LOG_FILE_NAME);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .json()
                .with_writer(file_writer)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt_layer)
        .with(json_layer)
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global tracing subscriber")?;

    Ok(TracingGuards {
        _stderr: stderr_guard,
        _file: file_guard,
    })
}

/// Route panics through `tracing` so they land in the same sinks as every other event
pub fn init_panic_handler() {
    panic::set_hook(Box::new(|panic_info| {
        let msg = match panic_info.payload().downcast_ref::<&str>() {
            Some(s) => (*s).to_string(),
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => s.clone(),
                None => "Unknown panic".to_string(),
            },
        };

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());

        error!(
            message = %msg,
            location = %location,
            "Application panicked!"
        );
    }));
}
