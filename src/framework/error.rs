//! # Framework Errors
//!
//! This module defines the error types shared by the registry, the resolver and
//! the orchestrator. Centralizing them keeps the failure taxonomy in one place:
//!
//! - [`ComponentError`] - an opaque failure raised by a single component.
//! - [`ConfigurationErrors`] - every configuration failure of one bootstrap, aggregated.
//! - [`OrchestratorError`] - what [`Orchestrator::run`](crate::lifecycle::Orchestrator::run)
//!   and registration can fail with.
//!
//! Each enum exposes `as_label` for stable snake_case labels in logs.

use std::fmt;

use thiserror::Error;

/// Errors raised by an individual component during configuration or while running.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ComponentError {
    /// A required setting was not provided.
    #[error("missing setting `{0}`")]
    MissingSetting(String),

    /// A setting was provided but could not be used.
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: String, reason: String },

    /// An I/O operation failed (binding a socket, opening a file, ...).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Free-form failure reported by the component.
    #[error("{0}")]
    Failed(String),

    /// The component's run task panicked.
    #[error("component panicked: {0}")]
    Panicked(String),

    /// The run task returned without signalling readiness or reporting an error.
    #[error("component exited before signalling readiness")]
    ExitedBeforeReady,

    /// The run task returned while the service was still supposed to be running.
    #[error("component exited before shutdown was requested")]
    ExitedBeforeShutdown,
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        ComponentError::Failed(message.into())
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentError::MissingSetting(_) => "component_missing_setting",
            ComponentError::InvalidSetting { .. } => "component_invalid_setting",
            ComponentError::Io(_) => "component_io",
            ComponentError::Failed(_) => "component_failed",
            ComponentError::Panicked(_) => "component_panicked",
            ComponentError::ExitedBeforeReady => "component_exited_before_ready",
            ComponentError::ExitedBeforeShutdown => "component_exited_before_shutdown",
        }
    }
}

/// Aggregate of every configuration failure observed during one bootstrap.
///
/// All components get a chance to configure before this is reported, so a
/// single run surfaces every misconfiguration at once.
#[derive(Debug, Default)]
pub struct ConfigurationErrors {
    errors: Vec<(String, ComponentError)>,
}

impl ConfigurationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, component: impl Into<String>, error: ComponentError) {
        self.errors.push((component.into(), error));
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Identifiers of the components that failed to configure.
    pub fn components(&self) -> Vec<&str> {
        self.errors.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Returns the error recorded for `component`, if any.
    pub fn get(&self, component: &str) -> Option<&ComponentError> {
        self.errors
            .iter()
            .find(|(id, _)| id == component)
            .map(|(_, e)| e)
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ConfigurationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ConfigurationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} component(s) failed to configure:", self.errors.len())?;
        for (id, e) in &self.errors {
            write!(f, "\n\t* [{id}] {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigurationErrors {}

/// Errors produced by registration, resolution and the bootstrap/shutdown protocol.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A component with the same identifier is already registered.
    #[error("duplicate component identifier `{0}`")]
    DuplicateIdentifier(String),

    /// A declared dependency names a component that was never registered.
    #[error("component `{component}` depends on unregistered component `{dependency}`")]
    MissingDependency {
        component: String,
        dependency: String,
    },

    /// No valid initialization order exists.
    #[error("circular dependency found among components: [{}]", .unresolved.join(", "))]
    CircularDependency {
        /// Identifiers still unresolved when no progress was possible (sorted).
        unresolved: Vec<String>,
    },

    /// One or more components failed to configure.
    #[error(transparent)]
    Configuration(#[from] ConfigurationErrors),

    /// A component failed before signalling readiness; remaining startup was aborted.
    #[error("component `{component}` failed to start: {source}")]
    Startup {
        component: String,
        #[source]
        source: ComponentError,
    },

    /// A component failed after reaching readiness; the service was shut down.
    #[error("component `{component}` failed while running: {source}")]
    Runtime {
        component: String,
        #[source]
        source: ComponentError,
    },
}

impl OrchestratorError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use service_orchestrator::framework::OrchestratorError;
    ///
    /// let err = OrchestratorError::DuplicateIdentifier("db".into());
    /// assert_eq!(err.as_label(), "duplicate_identifier");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestratorError::DuplicateIdentifier(_) => "duplicate_identifier",
            OrchestratorError::MissingDependency { .. } => "missing_dependency",
            OrchestratorError::CircularDependency { .. } => "circular_dependency",
            OrchestratorError::Configuration(_) => "configuration_error",
            OrchestratorError::Startup { .. } => "startup_error",
            OrchestratorError::Runtime { .. } => "runtime_error",
        }
    }

    /// Identifier of the component the error is attributed to, when there is exactly one.
    pub fn component(&self) -> Option<&str> {
        match self {
            OrchestratorError::DuplicateIdentifier(id) => Some(id),
            OrchestratorError::MissingDependency { component, .. }
            | OrchestratorError::Startup { component, .. }
            | OrchestratorError::Runtime { component, .. } => Some(component),
            OrchestratorError::CircularDependency { .. }
            | OrchestratorError::Configuration(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_render_every_failure() {
        let mut errors = ConfigurationErrors::new();
        errors.push("db", ComponentError::MissingSetting("db.url".into()));
        errors.push("cache", ComponentError::failed("bad size"));

        let text = errors.to_string();
        assert!(text.starts_with("2 component(s) failed to configure:"));
        assert!(text.contains("[db] missing setting `db.url`"));
        assert!(text.contains("[cache] bad size"));
        assert_eq!(errors.components(), vec!["db", "cache"]);
        assert_eq!(errors.len(), 2);
        assert!(!errors.is_empty());
    }

    #[test]
    fn empty_aggregate_is_ok() {
        assert!(ConfigurationErrors::new().into_result().is_ok());
    }

    #[test]
    fn circular_dependency_lists_unresolved_ids() {
        let err = OrchestratorError::CircularDependency {
            unresolved: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "circular dependency found among components: [a, b]"
        );
        assert_eq!(err.component(), None);
    }

    #[test]
    fn startup_error_keeps_component_source() {
        let err = OrchestratorError::Startup {
            component: "cache".into(),
            source: ComponentError::failed("connection refused"),
        };
        assert_eq!(err.as_label(), "startup_error");
        assert_eq!(err.component(), Some("cache"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("connection refused"));
    }
}
