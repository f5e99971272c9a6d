//! Structured logging setup and workflow log helpers.
//!
//! The CLI calls [`init_tracing`] once at startup. Library crates emit events
//! through `tracing` macros directly or through the helpers below, which keep
//! field names consistent across the vault, backend and workflow crates.

use tracing::{Level, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise verbose mode enables debug output for
/// clara crates and the compact mode only shows clara info and warnings from
/// dependencies.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new(
                    "clara=debug,clara_vault=debug,clara_backend=debug,clara_workflow=debug,info",
                )
            } else {
                EnvFilter::try_new("clara=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span wrapping one workflow action (`ingest`, `flush`, `chat`, ...).
pub fn workflow_span(action: &str) -> tracing::Span {
    span!(Level::INFO, "workflow", action = %action)
}

/// Log a status transition of the ingestion workflow.
pub fn log_status_transition(from: &str, to: &str) {
    info!(from = %from, to = %to, "Workflow status changed");
}

/// Log a backend failure. The message is masked with [`mask_secret`] first
/// so an echoed API key never reaches the log sink.
pub fn log_backend_failure(operation: &str, error: &str, secret: Option<&str>) {
    let sanitized = match secret {
        Some(secret) => mask_secret(error, secret),
        None => error.to_string(),
    };
    warn!(operation = %operation, error = %sanitized, "Backend request failed");
}

/// Replace every occurrence of `secret` in `text` with `***`.
///
/// Empty secrets leave the text untouched.
#[must_use]
pub fn mask_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, "***")
}
