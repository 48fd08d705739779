//! Structured logging configuration.
//!
//! The terminal is owned by the TUI, so log output goes to a file. Records
//! emitted by `ems_core` through the `log` facade are forwarded into the
//! same subscriber.

use std::{
    fs::{self, OpenOptions},
    io,
    path::Path,
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn";

/// Initialize file logging
///
/// Log levels can be configured via the RUST_LOG env var.
///
/// # Errors
///
/// Returns an error if the log file or its directory can't be created.
///
/// # Example
///
/// ```no_run
/// use ems_client::logging;
///
/// logging::init("/tmp/ems_client.log".as_ref()).unwrap();
/// tracing::info!("Client starting");
/// ```
pub fn init(log_file: &Path) -> io::Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(io::Error::other)?;

    tracing::info!(path = %log_file.display(), "Logging initialized");
    Ok(())
}
