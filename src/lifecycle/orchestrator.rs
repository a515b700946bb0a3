use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::{OrchestratorConfig, ServiceInfo};
use crate::framework::signal::ReadyWatch;
use crate::framework::{
    BootstrapSequence, Component, ComponentDescriptor, ComponentError, ComponentFailure,
    ComponentState, ConfigureContext, ErrorReporter, OrchestratorError, ReadySignal, Registry,
};
use crate::lifecycle::{signals, ShutdownHandle, ShutdownReason, ShutdownTrigger, StatusBoard};

/// Empty extra-dependency list for [`Orchestrator::register_component`].
pub const NO_DEPS: [&str; 0] = [];

/// Starts registered components in dependency order and coordinates their shutdown.
///
/// `Orchestrator` is responsible for:
/// - **Registration**: Collecting components and their dependency edges
/// - **Resolution**: Computing the bootstrap sequence (fails on cycles)
/// - **Configuration**: Configuring every component, aggregating failures
/// - **Staged Startup**: Starting components one at a time, each gated on the previous one's readiness
/// - **Shutdown**: Broadcasting one shutdown signal and waiting for every started component
///
/// # Lifecycle
///
/// ```text
/// register_component() ×N
///        │
/// run() ─┼─► resolve ──► configure all ──► for id in sequence:
///        │                                   spawn run(ready, shutdown, errors)
///        │                                   wait: ready │ error │ shutdown
///        │                                          │       └─► abort startup
///        │                                          ▼
///        │                                   bootstrap completed
///        │                                          │
///        │               wait: first error │ shutdown request │ OS signal
///        │                                          ▼
///        └─► broadcast shutdown ──► join every component task ──► Ok / first fatal error
/// ```
///
/// # Example
///
/// ```ignore
/// let mut orchestrator = Orchestrator::new(info, OrchestratorConfig::default());
/// orchestrator.register_component(Database::new(), NO_DEPS)?;
/// orchestrator.register_component(Api::new(), ["db"])?;
///
/// let handle = orchestrator.shutdown_handle();
/// // hand `handle` to whatever should be able to stop the service
///
/// orchestrator.run().await?;
/// ```
pub struct Orchestrator {
    info: ServiceInfo,
    config: OrchestratorConfig,
    registry: Registry,
    shutdown: ShutdownTrigger,
    status: StatusBoard,
}

impl Orchestrator {
    pub fn new(info: ServiceInfo, config: OrchestratorConfig) -> Self {
        Self {
            info,
            config,
            registry: Registry::new(),
            shutdown: ShutdownTrigger::new(),
            status: StatusBoard::new(),
        }
    }

    /// Registers `component`, merging `extra_dependencies` into its declared set.
    pub fn register_component<C, I, S>(
        &mut self,
        component: C,
        extra_dependencies: I,
    ) -> Result<(), OrchestratorError>
    where
        C: Component,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register_boxed(Box::new(component), extra_dependencies)
    }

    /// Same as [`register_component`](Self::register_component) for an already boxed component.
    pub fn register_boxed<I, S>(
        &mut self,
        component: Box<dyn Component>,
        extra_dependencies: I,
    ) -> Result<(), OrchestratorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = component.id().to_string();
        if let Err(e) = self.registry.register(component, extra_dependencies) {
            warn!(component = %id, error = %e, "registration rejected");
            return Err(e);
        }
        self.status.set(&id, ComponentState::Unconfigured);
        debug!(component = %id, "component registered");
        Ok(())
    }

    /// Looks up a registered component.
    pub fn component(&self, id: &str) -> Option<&dyn Component> {
        self.registry.get(id).map(ComponentDescriptor::component)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn info(&self) -> &ServiceInfo {
        &self.info
    }

    /// Resolves the current registry without starting anything.
    pub fn bootstrap_sequence(&self) -> Result<BootstrapSequence, OrchestratorError> {
        self.registry.dependency_graph().resolve()
    }

    /// Handle that can stop the orchestrator from any task, before or during [`run`](Self::run).
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.handle()
    }

    /// Requests shutdown. Idempotent.
    pub fn request_shutdown(&self) {
        self.shutdown.trigger(ShutdownReason::Requested);
    }

    /// Shared view of per-component lifecycle states; stays valid after `run` returns.
    pub fn status(&self) -> StatusBoard {
        self.status.clone()
    }

    /// Runs the service until shutdown completes.
    ///
    /// Returns `Ok(())` after a clean, requested shutdown, otherwise the resolution error,
    /// the aggregated configuration errors, or the first startup/runtime error.
    pub async fn run(self) -> Result<(), OrchestratorError> {
        let span = info_span!(
            "service",
            name = %self.info.name,
            version = %self.info.version,
            build = %self.info.build,
        );
        self.run_inner().instrument(span).await
    }

    async fn run_inner(self) -> Result<(), OrchestratorError> {
        let Orchestrator {
            info,
            config,
            registry,
            shutdown,
            status,
        } = self;

        info!("bootstrapping service components...");
        let sequence = match registry.dependency_graph().resolve() {
            Ok(sequence) => sequence,
            Err(e) => {
                error!(error = %e, label = e.as_label(), "unable to compute bootstrap sequence");
                return Err(e);
            }
        };
        info!(%sequence, "bootstrap sequence");

        let components = configure_all(
            &sequence,
            registry.into_descriptors(),
            &info,
            &config,
            &status,
        )
        .await?;

        let listener = config
            .handle_os_signals
            .then(|| spawn_signal_listener(shutdown.clone()));

        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let runtime = Runtime {
            shutdown,
            status,
            tasks: JoinSet::new(),
            errors_tx,
            errors_rx,
        };
        let result = runtime.execute(components).await;

        if let Some(listener) = listener {
            listener.abort();
        }
        result
    }
}

/// Configures every component in sequence order; all get a chance before failures surface.
async fn configure_all(
    sequence: &BootstrapSequence,
    mut descriptors: HashMap<String, ComponentDescriptor>,
    info: &ServiceInfo,
    config: &OrchestratorConfig,
    status: &StatusBoard,
) -> Result<Vec<(String, Arc<dyn Component>)>, OrchestratorError> {
    info!("configuring service...");
    let ctx = ConfigureContext::new(info, &config.settings, config.debug);
    let mut errors = crate::framework::ConfigurationErrors::new();
    let mut configured: Vec<(String, Arc<dyn Component>)> = Vec::with_capacity(sequence.len());

    for id in sequence.iter() {
        let Some(descriptor) = descriptors.remove(id) else {
            continue;
        };
        let mut component = descriptor.into_component();
        match component.configure(&ctx).await {
            Ok(()) => status.set(id, ComponentState::Configured),
            Err(e) => {
                error!(component = %id, error = %e, "configuration failed");
                errors.push(id, e);
            }
        }
        configured.push((id.to_string(), Arc::from(component)));
    }

    errors.into_result()?;
    Ok(configured)
}

fn spawn_signal_listener(trigger: ShutdownTrigger) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            match signals::wait_for_termination().await {
                Ok(()) => {
                    info!("termination signal received");
                    trigger.trigger(ShutdownReason::Signal);
                }
                Err(e) => warn!(error = %e, "unable to listen for termination signals"),
            }
        }
        .in_current_span(),
    )
}

/// How the staged startup ended, when it did not fail.
enum Startup {
    Completed,
    Interrupted,
}

/// State of one bootstrap, from the first spawned component to the last join.
struct Runtime {
    shutdown: ShutdownTrigger,
    status: StatusBoard,
    tasks: JoinSet<String>,
    errors_tx: mpsc::UnboundedSender<ComponentFailure>,
    errors_rx: mpsc::UnboundedReceiver<ComponentFailure>,
}

impl Runtime {
    async fn execute(
        mut self,
        components: Vec<(String, Arc<dyn Component>)>,
    ) -> Result<(), OrchestratorError> {
        let fatal = match self.start_all(components).await {
            Ok(Startup::Completed) => {
                info!("service bootstrap completed");
                self.supervise().await
            }
            Ok(Startup::Interrupted) => {
                info!("startup interrupted by shutdown request");
                None
            }
            Err(e) => {
                self.shutdown.trigger(shutdown_reason(&e));
                Some(e)
            }
        };

        self.wait_for_stop().await;

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Starts components strictly in sequence, each gated on the previous one's readiness.
    async fn start_all(
        &mut self,
        components: Vec<(String, Arc<dyn Component>)>,
    ) -> Result<Startup, OrchestratorError> {
        for (id, component) in components {
            if self.shutdown.is_triggered() {
                return Ok(Startup::Interrupted);
            }
            debug!(component = %id, "initializing component...");
            let watch = self.spawn(id.clone(), component);
            if let Startup::Interrupted = self.await_ready(&id, watch).await? {
                return Ok(Startup::Interrupted);
            }
            debug!(component = %id, "component initialized");
        }
        Ok(Startup::Completed)
    }

    fn spawn(&mut self, id: String, component: Arc<dyn Component>) -> ReadyWatch {
        let (ready, watch) = ReadySignal::channel();
        let fired = watch.fired.clone();
        let shutdown = self.shutdown.signal();
        let reporter = ErrorReporter::new(&id, self.errors_tx.clone());
        let span = info_span!("component", id = %id);

        self.status.set(&id, ComponentState::Starting);
        self.tasks.spawn(
            async move {
                let outcome =
                    AssertUnwindSafe(component.run(ready, shutdown.clone(), reporter.clone()))
                        .catch_unwind()
                        .await;

                match outcome {
                    Err(panic) => reporter.report(ComponentError::Panicked(panic_message(panic))),
                    Ok(()) if shutdown.is_shutdown() || reporter.has_reported() => {}
                    Ok(()) if fired.load(Ordering::Acquire) => {
                        reporter.report(ComponentError::ExitedBeforeShutdown)
                    }
                    Ok(()) => reporter.report(ComponentError::ExitedBeforeReady),
                }
                id
            }
            .instrument(span),
        );
        watch
    }

    /// Blocks until the starting component is ready, something fails, or shutdown is requested.
    async fn await_ready(
        &mut self,
        id: &str,
        watch: ReadyWatch,
    ) -> Result<Startup, OrchestratorError> {
        let ReadyWatch { mut rx, fired } = watch;
        let shutdown = self.shutdown.signal();
        let mut closed = false;

        loop {
            tokio::select! {
                biased;
                Some(failure) = self.errors_rx.recv() => {
                    let ready = failure.component != id || fired.load(Ordering::Acquire);
                    return Err(self.fatal(failure, ready));
                }
                res = &mut rx, if !closed => match res {
                    Ok(()) => {
                        self.status.set(id, ComponentState::Running);
                        return Ok(Startup::Completed);
                    }
                    // Dropped without readiness; the failure report follows on the error channel.
                    Err(_) => closed = true,
                },
                _ = shutdown.wait() => return Ok(Startup::Interrupted),
            }
        }
    }

    /// Steady state: returns the first runtime error, or `None` once shutdown is requested.
    async fn supervise(&mut self) -> Option<OrchestratorError> {
        let shutdown = self.shutdown.signal();
        tokio::select! {
            biased;
            Some(failure) = self.errors_rx.recv() => {
                let e = self.fatal(failure, true);
                self.shutdown.trigger(ShutdownReason::RuntimeFailure);
                Some(e)
            }
            _ = shutdown.wait() => None,
        }
    }

    /// Waits for every started component to return; later errors are only logged.
    async fn wait_for_stop(&mut self) {
        self.status
            .transition_all(ComponentState::Running, ComponentState::ShuttingDown);
        self.status
            .transition_all(ComponentState::Starting, ComponentState::ShuttingDown);
        info!(pending = self.tasks.len(), "waiting for shutdown to complete...");

        loop {
            tokio::select! {
                joined = self.tasks.join_next() => match joined {
                    Some(Ok(id)) => {
                        debug!(component = %id, "component stopped");
                        self.status.set(&id, ComponentState::Stopped);
                    }
                    Some(Err(e)) => error!(error = %e, "component task aborted"),
                    None => break,
                },
                Some(failure) = self.errors_rx.recv() => self.suppress(failure),
            }
        }
        while let Ok(failure) = self.errors_rx.try_recv() {
            self.suppress(failure);
        }
        info!("shutdown completed");
    }

    fn fatal(&self, failure: ComponentFailure, ready: bool) -> OrchestratorError {
        let ComponentFailure { component, error } = failure;
        error!(component = %component, error = %error, label = error.as_label(), "caught service error");
        self.status.set(&component, ComponentState::Failed);
        if ready {
            OrchestratorError::Runtime {
                component,
                source: error,
            }
        } else {
            OrchestratorError::Startup {
                component,
                source: error,
            }
        }
    }

    fn suppress(&self, failure: ComponentFailure) {
        warn!(
            component = %failure.component,
            error = %failure.error,
            label = failure.error.as_label(),
            "error reported during shutdown"
        );
        self.status.set(&failure.component, ComponentState::Failed);
    }
}

/// Shutdown reason for an error that ended the staged startup.
fn shutdown_reason(error: &OrchestratorError) -> ShutdownReason {
    match error {
        OrchestratorError::Runtime { .. } => ShutdownReason::RuntimeFailure,
        _ => ShutdownReason::StartupFailure,
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
