//! Building blocks of the orchestrator.
//!
//! This module defines what a component is and how the set of components is
//! turned into a start order.
//!
//! # Main Components
//!
//! - [`Component`] - The lifecycle contract every managed unit implements
//! - [`ReadySignal`], [`ShutdownSignal`], [`ErrorReporter`] - Handles passed into [`Component::run`]
//! - [`Registry`] - Registered components and their dependency edges
//! - [`DependencyGraph`] - Resolves the registry into a [`BootstrapSequence`]
//! - [`OrchestratorError`], [`ComponentError`] - Error taxonomy
//!
//! # Testing
//!
//! See [`mock`] module for a scripted component that records its lifecycle.

pub mod component;
pub mod error;
pub mod mock;
pub mod registry;
pub mod resolver;
pub mod signal;

pub use component::{Component, ComponentState, ConfigureContext};
pub use error::{ComponentError, ConfigurationErrors, OrchestratorError};
pub use registry::{ComponentDescriptor, Registry};
pub use resolver::{BootstrapSequence, DependencyGraph};
pub use signal::{ComponentFailure, ErrorReporter, ReadySignal, ShutdownSignal};
