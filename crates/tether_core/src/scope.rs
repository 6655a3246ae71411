//! Deterministic release of a component's bindings
//!
//! A component creates its bindings through a [`BindingScope`] and disposes
//! the scope when it is torn down. Disposal removes every tracked binding in
//! reverse creation order, so derived bindings go before the bindings they
//! were derived from.

use crate::binding::{Binding, BindingGraph, BindingId};
use crate::transition::TransitionRef;
use crate::value::{PropertyValue, ValueKind};

#[derive(Debug, Default)]
pub struct BindingScope {
    tracked: Vec<BindingId>,
}

impl BindingScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an existing binding
    pub fn track(&mut self, id: impl Into<BindingId>) {
        self.tracked.push(id.into());
    }

    pub fn create<T: PropertyValue>(&mut self, graph: &mut BindingGraph) -> Binding<T> {
        let binding = graph.create::<T>();
        self.track(binding);
        binding
    }

    pub fn create_with<T: PropertyValue>(&mut self, graph: &mut BindingGraph, initial: T) -> Binding<T> {
        let binding = graph.create_with(initial);
        self.track(binding);
        binding
    }

    pub fn create_with_transition<T: PropertyValue>(
        &mut self,
        graph: &mut BindingGraph,
        initial: T,
        transition: TransitionRef,
    ) -> Binding<T> {
        let binding = graph.create_with_transition(initial, transition);
        self.track(binding);
        binding
    }

    pub fn create_dynamic(&mut self, graph: &mut BindingGraph, kind: ValueKind) -> BindingId {
        let id = graph.create_dynamic(kind);
        self.track(id);
        id
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Remove every tracked binding, newest first. Calling it again is a no-op.
    ///
    /// Bindings already removed elsewhere are skipped.
    pub fn dispose(&mut self, graph: &mut BindingGraph) {
        let count = self.tracked.len();
        for id in self.tracked.drain(..).rev() {
            if graph.remove(id).is_err() {
                tracing::trace!(?id, "binding already removed");
            }
        }
        if count > 0 {
            tracing::debug!(count, "disposed binding scope");
        }
    }
}
