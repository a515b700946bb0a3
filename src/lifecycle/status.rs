//! # Component status board.
//!
//! Tracks the [`ComponentState`] of every registered component across one run.
//! The orchestrator writes transitions; the host reads snapshots, before, during
//! or after [`Orchestrator::run`](crate::lifecycle::Orchestrator::run).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::framework::ComponentState;

/// Shared map of component id → lifecycle state.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    states: Arc<Mutex<BTreeMap<String, ComponentState>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a transition. `Failed` is sticky: later transitions are ignored.
    pub fn set(&self, component: &str, state: ComponentState) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        match states.get(component) {
            Some(ComponentState::Failed) => {}
            Some(current) if *current == state => {}
            _ => {
                debug!(component, state = state.as_label(), "component state");
                states.insert(component.to_string(), state);
            }
        }
    }

    /// Moves every component currently in `from` to `to`.
    pub fn transition_all(&self, from: ComponentState, to: ComponentState) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        for (component, state) in states.iter_mut().filter(|(_, s)| **s == from) {
            debug!(component = %component, state = to.as_label(), "component state");
            *state = to;
        }
    }

    pub fn get(&self, component: &str) -> Option<ComponentState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(component)
            .copied()
    }

    pub fn snapshot(&self) -> BTreeMap<String, ComponentState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Components whose run task may still be executing.
    pub fn active(&self) -> Vec<String> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, s)| s.is_active())
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_state_is_sticky() {
        let board = StatusBoard::new();
        board.set("db", ComponentState::Running);
        board.set("db", ComponentState::Failed);
        board.set("db", ComponentState::Stopped);
        assert_eq!(board.get("db"), Some(ComponentState::Failed));
    }

    #[test]
    fn transition_all_only_moves_matching_states() {
        let board = StatusBoard::new();
        board.set("db", ComponentState::Running);
        board.set("cache", ComponentState::Running);
        board.set("api", ComponentState::Configured);

        board.transition_all(ComponentState::Running, ComponentState::ShuttingDown);

        let snapshot = board.snapshot();
        assert_eq!(snapshot["db"], ComponentState::ShuttingDown);
        assert_eq!(snapshot["cache"], ComponentState::ShuttingDown);
        assert_eq!(snapshot["api"], ComponentState::Configured);
        assert_eq!(board.active(), vec!["cache", "db"]);
    }
}
