//! # Demonstration Components
//!
//! Two small [`Component`](crate::framework::Component) implementations used by the
//! demo binary and the end-to-end tests:
//!
//! - [`Heartbeat`] - periodic worker counting ticks until shutdown
//! - [`StatusListener`] - TCP listener answering every connection with one JSON status line;
//!   depends on [`Heartbeat`]

pub mod heartbeat;
pub mod status_listener;

pub use heartbeat::Heartbeat;
pub use status_listener::{StatusListener, StatusLine};
