//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide `tracing` subscriber.
//!
//! ## Configuration
//!
//! - `RUST_LOG` always wins when set.
//! - Otherwise the level is `debug` in debug mode and `info` elsewhere.
//! - [`LogFormat::Human`] prints compact lines without module paths.
//! - [`LogFormat::Json`] prints one JSON object per line.
//!
//! ## What Gets Traced
//!
//! - **Service span**: `service{name, version, build}` wraps the whole run
//! - **Component spans**: `component{id}` wraps each run task
//! - **Lifecycle**: configuration, bootstrap sequence, readiness, shutdown
//! - **Errors**: the fatal error, plus any error suppressed during shutdown
//!
//! ## Usage Examples
//!
//! ```bash
//! # Human readable
//! LOG_FORMAT=human cargo run
//!
//! # Show state transitions
//! cargo run -- --debug --log-format human
//!
//! # Filter to the orchestrator only
//! RUST_LOG=service_orchestrator::lifecycle=debug cargo run
//! ```
//!
//! Example output with `--log-format human`:
//!
//! ```text
//! INFO service: bootstrap sequence sequence=heartbeat, status-listener
//! INFO service:component: heartbeat ready interval_ms=1000
//! INFO service:component: listening addr=127.0.0.1:8080
//! INFO service: service bootstrap completed
//! INFO service: shutdown requested reason=signal
//! INFO service: shutdown completed
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

pub fn setup_tracing(format: LogFormat, debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match format {
        LogFormat::Human => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}
