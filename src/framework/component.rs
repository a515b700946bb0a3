//! # The Component Contract
//!
//! Every unit managed by the orchestrator implements [`Component`]: an identifier,
//! a declared dependency set, a one-shot configuration step and a long-running
//! run step.
//!
//! ## Architecture Note
//! Heterogeneous component kinds (listeners, bus clients, storage clients) share
//! this single capability trait and are stored as trait objects. There is no
//! hierarchy; each kind is a separate implementation.
//!
//! ## The run contract
//!
//! ```text
//! run(ready, shutdown, errors)
//!   ├─ set up resources
//!   │    └─ on failure: errors.report(e); return        (never calls ready)
//!   ├─ ready.ready()                                    (exactly once)
//!   ├─ loop { select! { shutdown.wait() => break, work => ... } }
//!   │    └─ fatal error while running: errors.report(e), keep waiting for shutdown
//!   └─ release resources; return
//! ```
//!
//! # Example
//! ```
//! use async_trait::async_trait;
//! use service_orchestrator::framework::{
//!     Component, ComponentError, ConfigureContext, ErrorReporter, ReadySignal, ShutdownSignal,
//! };
//!
//! struct Cache { capacity: usize }
//!
//! #[async_trait]
//! impl Component for Cache {
//!     fn id(&self) -> &str { "cache" }
//!
//!     fn depends_on(&self) -> Vec<String> { vec!["db".into()] }
//!
//!     async fn configure(&mut self, ctx: &ConfigureContext<'_>) -> Result<(), ComponentError> {
//!         self.capacity = ctx.settings().parse("cache.capacity")?.unwrap_or(1024);
//!         Ok(())
//!     }
//!
//!     async fn run(&self, ready: ReadySignal, shutdown: ShutdownSignal, _errors: ErrorReporter) {
//!         ready.ready();
//!         shutdown.wait().await;
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::config::{ServiceInfo, Settings};
use crate::framework::{ComponentError, ErrorReporter, ReadySignal, ShutdownSignal};

/// A lifecycled unit of a service.
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Stable identifier, unique within one orchestrator.
    fn id(&self) -> &str;

    /// Identifiers that must reach readiness before this component starts.
    fn depends_on(&self) -> Vec<String> {
        Vec::new()
    }

    /// One-shot setup, called before any component is started.
    async fn configure(&mut self, _ctx: &ConfigureContext<'_>) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Runs the component until `shutdown` fires.
    ///
    /// Must call [`ReadySignal::ready`] once able to serve, and must return only
    /// after observing `shutdown` (or right after reporting a failure to `errors`
    /// if readiness was never reached).
    async fn run(&self, ready: ReadySignal, shutdown: ShutdownSignal, errors: ErrorReporter);
}

/// What a component sees while configuring.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureContext<'a> {
    service: &'a ServiceInfo,
    settings: &'a Settings,
    debug: bool,
}

impl<'a> ConfigureContext<'a> {
    pub fn new(service: &'a ServiceInfo, settings: &'a Settings, debug: bool) -> Self {
        Self {
            service,
            settings,
            debug,
        }
    }

    pub fn service(&self) -> &'a ServiceInfo {
        self.service
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// Whether the service runs with debug logging enabled.
    pub fn debug_mode(&self) -> bool {
        self.debug
    }
}

/// Lifecycle state of one component.
///
/// ```text
/// Unconfigured → Configured → Starting → Running → ShuttingDown → Stopped
///                                 │          │
///                                 └──────────┴──► Failed
/// ```
///
/// `Failed` is sticky: a failed component that had reached `Running` still runs
/// its own cleanup, but its final state stays `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    Unconfigured,
    Configured,
    Starting,
    Running,
    ShuttingDown,
    Stopped,
    Failed,
}

impl ComponentState {
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentState::Unconfigured => "unconfigured",
            ComponentState::Configured => "configured",
            ComponentState::Starting => "starting",
            ComponentState::Running => "running",
            ComponentState::ShuttingDown => "shutting_down",
            ComponentState::Stopped => "stopped",
            ComponentState::Failed => "failed",
        }
    }

    /// `true` while the run task may still be executing.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ComponentState::Starting | ComponentState::Running | ComponentState::ShuttingDown
        )
    }
}
