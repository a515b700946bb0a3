//! # Shutdown Coordination
//!
//! [`ShutdownTrigger`] is the single process-wide shutdown state: a flag plus a
//! broadcast cancellation token, created once per orchestrator and never reset.
//!
//! ## Rules
//! - the first [`trigger`](ShutdownTrigger::trigger) flips the flag and cancels the token
//! - every later call is a no-op and returns `false`
//! - safe to call from any task or thread, concurrently
//!
//! The hosting process only gets a [`ShutdownHandle`], which can request shutdown
//! but cannot observe internal state beyond "was it requested".

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::framework::ShutdownSignal;

/// Why shutdown was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Requested by the hosting process.
    Requested,
    /// An OS termination signal was received.
    Signal,
    /// A component failed before becoming ready.
    StartupFailure,
    /// A running component reported an error.
    RuntimeFailure,
}

impl ShutdownReason {
    pub fn as_label(&self) -> &'static str {
        match self {
            ShutdownReason::Requested => "requested",
            ShutdownReason::Signal => "signal",
            ShutdownReason::StartupFailure => "startup_failure",
            ShutdownReason::RuntimeFailure => "runtime_failure",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    token: CancellationToken,
}

/// Idempotent shutdown trigger shared by the orchestrator and its handles.
#[derive(Debug, Clone, Default)]
pub struct ShutdownTrigger {
    inner: Arc<Inner>,
}

impl ShutdownTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Returns `true` only for the call that actually broadcast it.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        if self.inner.requested.swap(true, Ordering::AcqRel) {
            debug!(%reason, "shutdown already requested");
            return false;
        }
        info!(%reason, "shutdown requested");
        self.inner.token.cancel();
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.requested.load(Ordering::Acquire)
    }

    /// Read-only view handed to components.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal::new(self.inner.token.clone())
    }

    /// Host-facing handle.
    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            trigger: self.clone(),
        }
    }
}

/// Handle the hosting process uses to stop a running orchestrator.
///
/// Cheap to clone; can be moved into signal handlers or other tasks.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    trigger: ShutdownTrigger,
}

impl ShutdownHandle {
    /// Requests a clean shutdown. Idempotent.
    pub fn request_shutdown(&self) {
        self.trigger.trigger(ShutdownReason::Requested);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.trigger.is_triggered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_trigger_broadcasts() {
        let trigger = ShutdownTrigger::new();
        assert!(!trigger.is_triggered());
        assert!(trigger.trigger(ShutdownReason::Requested));
        assert!(!trigger.trigger(ShutdownReason::Signal));
        assert!(!trigger.trigger(ShutdownReason::RuntimeFailure));
        assert!(trigger.is_triggered());
        assert!(trigger.signal().is_shutdown());
    }

    #[tokio::test]
    async fn concurrent_triggers_broadcast_exactly_once() {
        let trigger = ShutdownTrigger::new();
        let signal = trigger.signal();

        let mut set = tokio::task::JoinSet::new();
        for _ in 0..32 {
            let t = trigger.clone();
            set.spawn(async move { t.trigger(ShutdownReason::Requested) });
        }

        let mut broadcasts = 0;
        while let Some(res) = set.join_next().await {
            if res.unwrap() {
                broadcasts += 1;
            }
        }
        assert_eq!(broadcasts, 1);
        signal.wait().await;
    }

    #[test]
    fn handle_requests_shutdown_idempotently() {
        let trigger = ShutdownTrigger::new();
        let handle = trigger.handle();
        handle.request_shutdown();
        handle.clone().request_shutdown();
        assert!(handle.is_shutdown_requested());
        assert!(trigger.signal().is_shutdown());
    }
}
