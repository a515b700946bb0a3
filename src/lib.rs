#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Service Orchestrator
//!
//! > **Dependency-ordered startup and coordinated shutdown for long-running services.**
//!
//! A service is a set of components (listeners, bus clients, storage clients, workers)
//! that depend on each other. This crate starts them in dependency order, waits for
//! each one to become ready before starting the next, and shuts all of them down
//! together when the host asks or when any one of them fails.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One contract, many components
//! Every managed unit implements the single [`Component`](framework::Component) trait:
//! an identifier, a dependency set, a configure step and a run step. The orchestrator
//! never knows what a component does, only where it is in its lifecycle.
//!
//! ### Readiness gates, not sleeps
//! A component's run step receives a write-once [`ReadySignal`](framework::ReadySignal).
//! The next component in the sequence is started only after it fires, so a listener
//! depending on a database never starts against a half-open connection pool.
//!
//! ### First error wins
//! Configuration errors are aggregated so one run reports every misconfiguration.
//! Startup and runtime errors are different: the first one stops the whole service,
//! and anything reported while shutting down is logged, not escalated.
//!
//! ## 🚀 Core Concepts
//!
//! ```text
//! register ──► resolve ──► configure (all) ──► start (one by one) ──► run ──► shutdown
//!     │            │              │                    │                │
//! Duplicate-   Circular-    Configuration-        Startup-         Runtime-
//! Identifier   Dependency   Error (aggregated)    Error            Error
//! ```
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Contract ([`framework`])
//! - **Role**: What a component is and how the set of components becomes a start order.
//! - **Key items**: [`Component`](framework::Component), [`Registry`](framework::Registry),
//!   [`DependencyGraph`](framework::DependencyGraph), [`OrchestratorError`](framework::OrchestratorError).
//!
//! ### 2. The Orchestrator ([`lifecycle`])
//! - **Role**: Drives bootstrap, supervision and shutdown.
//! - **Key items**: [`Orchestrator`](lifecycle::Orchestrator), [`ShutdownHandle`](lifecycle::ShutdownHandle),
//!   [`StatusBoard`](lifecycle::StatusBoard), [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ### 3. Configuration ([`config`])
//! - **Role**: Service identity, command line flags and component settings.
//!
//! ### 4. Components ([`components`])
//! - **Role**: Two small components used by the demo binary.
//!
//! ### Mocking
//! Lifecycle tests use [`MockComponent`](framework::mock::MockComponent), which records
//! every step into an [`EventLog`](framework::mock::EventLog).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Human readable logs, status on port 9000
//! cargo run -- --log-format human --set status-listener.addr=127.0.0.1:9000
//!
//! # Ask for the status
//! nc 127.0.0.1 9000
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod components;
pub mod config;
pub mod framework;
pub mod lifecycle;
