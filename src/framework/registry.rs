//! # Component Registry
//!
//! Holds registered components and their declared dependency edges.
//!
//! ## Rules
//! - identifiers are unique; a duplicate registration fails and leaves the first one in place
//! - dependencies may name components registered later; they are checked at resolution time
//! - there is no removal: the registry is write-once-then-read for one bootstrap

use std::collections::{BTreeSet, HashMap};

use crate::framework::{Component, DependencyGraph, OrchestratorError};

/// A registered component together with its full dependency set.
pub struct ComponentDescriptor {
    component: Box<dyn Component>,
    dependencies: BTreeSet<String>,
}

impl ComponentDescriptor {
    pub fn id(&self) -> &str {
        self.component.id()
    }

    /// Declared dependencies merged with the extra ones given at registration.
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    pub(crate) fn into_component(self) -> Box<dyn Component> {
        self.component
    }
}

/// Arena of component descriptors indexed by identifier.
#[derive(Default)]
pub struct Registry {
    descriptors: Vec<ComponentDescriptor>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `component`, merging `extra_dependencies` into its declared set.
    ///
    /// Fails with [`OrchestratorError::DuplicateIdentifier`] if the identifier is taken.
    pub fn register<I, S>(
        &mut self,
        component: Box<dyn Component>,
        extra_dependencies: I,
    ) -> Result<(), OrchestratorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = component.id().to_string();
        if self.index.contains_key(&id) {
            return Err(OrchestratorError::DuplicateIdentifier(id));
        }

        let dependencies: BTreeSet<String> = component
            .depends_on()
            .into_iter()
            .chain(extra_dependencies.into_iter().map(Into::into))
            .collect();

        self.index.insert(id, self.descriptors.len());
        self.descriptors.push(ComponentDescriptor {
            component,
            dependencies,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDescriptor> {
        self.index.get(id).map(|&i| &self.descriptors[i])
    }

    /// Identifiers in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.id())
    }

    /// Builds the identifier → dependency-set graph handed to the resolver.
    pub fn dependency_graph(&self) -> DependencyGraph {
        self.descriptors
            .iter()
            .map(|d| (d.id().to_string(), d.dependencies.iter().cloned()))
            .collect()
    }

    /// Consumes the registry, yielding descriptors keyed by identifier.
    pub(crate) fn into_descriptors(self) -> HashMap<String, ComponentDescriptor> {
        self.descriptors
            .into_iter()
            .map(|d| (d.id().to_string(), d))
            .collect()
    }
}
