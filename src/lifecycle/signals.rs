//! # OS termination signals.
//!
//! [`wait_for_termination`] completes when the process receives a termination signal:
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT`, plus [`tokio::signal::ctrl_c`].
//!
//! **Other platforms:** [`tokio::signal::ctrl_c`] only.

/// Waits for a termination signal.
///
/// Returns `Err` if the signal listeners cannot be installed.
#[cfg(unix)]
pub async fn wait_for_termination() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_termination() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
