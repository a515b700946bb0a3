//! # Mock Framework
//!
//! Utilities for testing the orchestrator without real listeners or clients.
//!
//! [`MockComponent`] implements [`Component`] with a scripted [`StartBehavior`]
//! and records every lifecycle step into a shared [`EventLog`]. Tests then assert
//! on the recorded order to verify happens-before relations:
//!
//! ```ignore
//! let log = EventLog::new();
//! orchestrator.register_component(MockComponent::new("db", &log), NO_DEPS)?;
//! orchestrator.register_component(MockComponent::new("cache", &log).depends_on(["db"]), NO_DEPS)?;
//! // ... run ...
//! assert!(log.happened_before(("db", MockEvent::Ready), ("cache", MockEvent::RunStarted)));
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time;

use crate::framework::{
    Component, ComponentError, ConfigureContext, ErrorReporter, ReadySignal, ShutdownSignal,
};

/// Lifecycle step recorded by a [`MockComponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    Configured,
    ConfigureFailed,
    RunStarted,
    Ready,
    ErrorReported,
    ShutdownObserved,
    Stopped,
}

/// One entry of the [`EventLog`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub component: String,
    pub event: MockEvent,
    pub at: Instant,
}

/// Shared, append-only record of mock lifecycle steps.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<Recorded>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, component: &str, event: MockEvent) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push(Recorded {
            component: component.to_string(),
            event,
            at: Instant::now(),
        });
    }

    pub fn entries(&self) -> Vec<Recorded> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Index of the first `(component, event)` entry.
    pub fn position(&self, component: &str, event: MockEvent) -> Option<usize> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .position(|r| r.component == component && r.event == event)
    }

    /// Timestamp of the first `(component, event)` entry.
    pub fn time_of(&self, component: &str, event: MockEvent) -> Option<Instant> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.component == component && r.event == event)
            .map(|r| r.at)
    }

    pub fn contains(&self, component: &str, event: MockEvent) -> bool {
        self.position(component, event).is_some()
    }

    /// `true` if both entries exist and `first` was recorded before `second`.
    pub fn happened_before(&self, first: (&str, MockEvent), second: (&str, MockEvent)) -> bool {
        match (self.position(first.0, first.1), self.position(second.0, second.1)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    /// Components that recorded `event`, in recording order.
    pub fn components_with(&self, event: MockEvent) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.event == event)
            .map(|r| r.component.clone())
            .collect()
    }
}

/// What a [`MockComponent`] does once its run step starts.
#[derive(Debug, Clone)]
pub enum StartBehavior {
    /// Signal readiness, then wait for shutdown.
    Ready,
    /// Report an error and return without signalling readiness.
    FailBeforeReady(String),
    /// Signal readiness, report an error after `after`, then wait for shutdown.
    FailAfterReady { after: Duration, message: String },
    /// Return without signalling readiness or reporting anything.
    ExitBeforeReady,
    /// Signal readiness, then return without waiting for shutdown.
    ExitAfterReady,
    /// Panic before signalling readiness.
    Panic(String),
}

/// Scripted [`Component`] that records its lifecycle into an [`EventLog`].
#[derive(Debug, Clone)]
pub struct MockComponent {
    id: String,
    dependencies: Vec<String>,
    configure_error: Option<String>,
    behavior: StartBehavior,
    ready_delay: Duration,
    stop_delay: Duration,
    log: EventLog,
}

impl MockComponent {
    pub fn new(id: impl Into<String>, log: &EventLog) -> Self {
        Self {
            id: id.into(),
            dependencies: Vec::new(),
            configure_error: None,
            behavior: StartBehavior::Ready,
            ready_delay: Duration::ZERO,
            stop_delay: Duration::ZERO,
            log: log.clone(),
        }
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Makes `configure` fail with `message`.
    pub fn fail_configure(mut self, message: impl Into<String>) -> Self {
        self.configure_error = Some(message.into());
        self
    }

    pub fn with_behavior(mut self, behavior: StartBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Delays the start behavior by `delay`.
    pub fn ready_after(mut self, delay: Duration) -> Self {
        self.ready_delay = delay;
        self
    }

    /// Delays cleanup after shutdown is observed.
    pub fn stop_after(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    async fn wait_for_shutdown(&self, shutdown: &ShutdownSignal) {
        shutdown.wait().await;
        self.log.record(&self.id, MockEvent::ShutdownObserved);
        if !self.stop_delay.is_zero() {
            time::sleep(self.stop_delay).await;
        }
        self.log.record(&self.id, MockEvent::Stopped);
    }
}

#[async_trait]
impl Component for MockComponent {
    fn id(&self) -> &str {
        &self.id
    }

    fn depends_on(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    async fn configure(&mut self, _ctx: &ConfigureContext<'_>) -> Result<(), ComponentError> {
        match &self.configure_error {
            Some(message) => {
                self.log.record(&self.id, MockEvent::ConfigureFailed);
                Err(ComponentError::failed(message.clone()))
            }
            None => {
                self.log.record(&self.id, MockEvent::Configured);
                Ok(())
            }
        }
    }

    async fn run(&self, ready: ReadySignal, shutdown: ShutdownSignal, errors: ErrorReporter) {
        self.log.record(&self.id, MockEvent::RunStarted);
        if !self.ready_delay.is_zero() {
            time::sleep(self.ready_delay).await;
        }

        match &self.behavior {
            StartBehavior::Ready => {
                self.log.record(&self.id, MockEvent::Ready);
                ready.ready();
                self.wait_for_shutdown(&shutdown).await;
            }
            StartBehavior::FailBeforeReady(message) => {
                self.log.record(&self.id, MockEvent::ErrorReported);
                errors.report(ComponentError::failed(message.clone()));
            }
            StartBehavior::FailAfterReady { after, message } => {
                self.log.record(&self.id, MockEvent::Ready);
                ready.ready();
                tokio::select! {
                    _ = time::sleep(*after) => {
                        self.log.record(&self.id, MockEvent::ErrorReported);
                        errors.report(ComponentError::failed(message.clone()));
                    }
                    _ = shutdown.wait() => {}
                }
                self.wait_for_shutdown(&shutdown).await;
            }
            StartBehavior::ExitBeforeReady => {}
            StartBehavior::ExitAfterReady => {
                self.log.record(&self.id, MockEvent::Ready);
                ready.ready();
            }
            StartBehavior::Panic(message) => panic!("{}", message),
        }
    }
}
