//! # Lifecycle Signals
//!
//! The three handles every [`Component::run`](crate::framework::Component::run) receives:
//!
//! | Handle | Direction | Semantics |
//! |---|---|---|
//! | [`ReadySignal`] | component → orchestrator | write-once; consumed by [`ReadySignal::ready`] |
//! | [`ShutdownSignal`] | orchestrator → components | read-only broadcast, closed exactly once |
//! | [`ErrorReporter`] | component → orchestrator | write-only, cloneable, usable at any time |
//!
//! Cancellation is cooperative: a component selects on [`ShutdownSignal::wait`]
//! next to its own work and returns once it fires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::framework::ComponentError;

/// Write-once "I am ready" notification owned by a starting component.
///
/// Consuming `self` in [`ready`](Self::ready) makes a second notification impossible.
/// Dropping the signal without calling `ready` tells the orchestrator the
/// component will never become ready.
#[derive(Debug)]
pub struct ReadySignal {
    tx: oneshot::Sender<()>,
    fired: Arc<AtomicBool>,
}

/// Orchestrator side of a [`ReadySignal`].
#[derive(Debug)]
pub(crate) struct ReadyWatch {
    pub(crate) rx: oneshot::Receiver<()>,
    pub(crate) fired: Arc<AtomicBool>,
}

impl ReadySignal {
    pub(crate) fn channel() -> (ReadySignal, ReadyWatch) {
        let (tx, rx) = oneshot::channel();
        let fired = Arc::new(AtomicBool::new(false));
        (
            ReadySignal {
                tx,
                fired: fired.clone(),
            },
            ReadyWatch { rx, fired },
        )
    }

    /// Announces that the component is able to serve.
    pub fn ready(self) {
        self.fired.store(true, Ordering::Release);
        let _ = self.tx.send(());
    }
}

/// Read-only view of the process-wide shutdown broadcast.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Returns `true` once shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when shutdown is requested (immediately if it already was).
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}

/// An error reported by a component on the shared error channel.
#[derive(Debug)]
pub struct ComponentFailure {
    pub component: String,
    pub error: ComponentError,
}

/// Write-only handle to the shared error channel, tagged with the owning component.
///
/// Cloneable so sub-tasks of a component can report asynchronously.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    component: Arc<str>,
    tx: mpsc::UnboundedSender<ComponentFailure>,
    reported: Arc<AtomicBool>,
}

impl ErrorReporter {
    pub(crate) fn new(component: &str, tx: mpsc::UnboundedSender<ComponentFailure>) -> Self {
        Self {
            component: Arc::from(component),
            tx,
            reported: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Identifier of the component this reporter belongs to.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// `true` once this reporter (or any clone of it) has reported an error.
    pub fn has_reported(&self) -> bool {
        self.reported.load(Ordering::Acquire)
    }

    /// Pushes an error onto the shared channel.
    ///
    /// Never blocks. Errors reported after the orchestrator finished are dropped.
    pub fn report(&self, error: impl Into<ComponentError>) {
        self.reported.store(true, Ordering::Release);
        let failure = ComponentFailure {
            component: self.component.to_string(),
            error: error.into(),
        };
        if let Err(mpsc::error::SendError(failure)) = self.tx.send(failure) {
            debug!(component = %failure.component, error = %failure.error, "error reported after orchestrator exit");
        }
    }
}
