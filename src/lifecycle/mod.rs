//! Runtime orchestration and lifecycle management.
//!
//! This module turns a set of registered components into a running service and
//! back again:
//!
//! - **Bootstrap**: resolve the start order, configure everything, start in sequence
//! - **Supervision**: the first error after startup stops the whole service
//! - **Shutdown**: one broadcast, then wait for every started component
//! - **Observability setup**: initializing tracing and logging
//!
//! # Main Components
//!
//! - [`Orchestrator`] - Owns the registry and drives the whole lifecycle
//! - [`ShutdownTrigger`] / [`ShutdownHandle`] - Idempotent shutdown broadcast
//! - [`StatusBoard`] - Observable per-component lifecycle state
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod orchestrator;
pub mod shutdown;
pub mod signals;
pub mod status;
pub mod tracing;

pub use orchestrator::{Orchestrator, NO_DEPS};
pub use shutdown::{ShutdownHandle, ShutdownReason, ShutdownTrigger};
pub use status::StatusBoard;
pub use self::tracing::setup_tracing;
