//! Binding presets
//!
//! A [`BindingPreset`] groups derived bindings behind one group binding.
//! Children are registered up front and wired lazily: nothing is connected
//! until the preset is enabled, which happens implicitly on the first
//! `set` or `connect` of the group binding.
//!
//! ```ignore
//! let mut border = BindingPreset::<f64>::new(&mut graph);
//! border.add_child(&mut graph, top_width, &[], |w, _| w)?;
//! border.add_child(&mut graph, left_width, &[], |w, _| w)?;
//!
//! // wires both children, then writes through them
//! border.set(&mut graph, 2.0)?;
//! ```

use smallvec::SmallVec;
use std::rc::Rc;

use crate::ancestors::Ancestors;
use crate::binding::{Binding, BindingGraph, BindingId, Transform};
use crate::error::Result;
use crate::transition::TransitionRef;
use crate::value::{PropertyValue, Value};

/// Wiring rule for one child of a preset
struct PresetChild {
    node: BindingId,
    extra_ancestors: SmallVec<[BindingId; 4]>,
    /// Receives `[group, ...extra_ancestors]`
    transform: Transform,
}

pub struct BindingPreset<G: PropertyValue> {
    binding: Binding<G>,
    enabled: bool,
    children: Vec<PresetChild>,
}

impl<G: PropertyValue> BindingPreset<G> {
    /// Create the preset and its group binding
    pub fn new(graph: &mut BindingGraph) -> Self {
        Self::from_binding(graph.create::<G>())
    }

    /// Use an existing binding as the group binding
    pub fn from_binding(binding: Binding<G>) -> Self {
        Self {
            binding,
            enabled: false,
            children: Vec::new(),
        }
    }

    pub fn binding(&self) -> Binding<G> {
        self.binding
    }

    pub fn get(&self, graph: &BindingGraph) -> Result<G> {
        graph.get(self.binding)
    }

    /// Enable the preset, then write the group binding
    pub fn set(&mut self, graph: &mut BindingGraph, value: G) -> Result<()> {
        self.set_enabled(graph, true)?;
        graph.set(self.binding, value)
    }

    /// Enable the preset, then derive the group binding from `ancestors`
    pub fn connect<A, F>(
        &mut self,
        graph: &mut BindingGraph,
        ancestors: A,
        transform: F,
        transition: Option<TransitionRef>,
    ) -> Result<()>
    where
        A: Ancestors,
        F: Fn(A::Values) -> G + 'static,
    {
        self.set_enabled(graph, true)?;
        graph.connect(self.binding, ancestors, transform, transition)
    }

    /// Disconnect the group binding; children stay wired to it
    pub fn disconnect(&mut self, graph: &mut BindingGraph) -> Result<()> {
        graph.disconnect(self.binding.id())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wire (or unwire) every registered child.
    ///
    /// Idempotent. Stops at the first child that fails; children handled
    /// before it keep their new wiring, the flag keeps its old value, and a
    /// later call retries every child.
    pub fn set_enabled(&mut self, graph: &mut BindingGraph, enabled: bool) -> Result<()> {
        if self.enabled == enabled {
            return Ok(());
        }
        tracing::debug!(group = ?self.binding.id(), enabled, children = self.children.len(), "preset toggled");

        for child in &self.children {
            if enabled {
                self.wire(graph, child)?;
            } else {
                graph.disconnect(child.node)?;
            }
        }
        self.enabled = enabled;
        Ok(())
    }

    /// Register a child derived from the group value and `extra_ancestors`.
    ///
    /// The transform receives the group value and the extra ancestor values
    /// in order. Wires immediately when the preset is enabled; the child stays
    /// registered even when that wiring fails.
    pub fn add_child<C, F>(
        &mut self,
        graph: &mut BindingGraph,
        child: Binding<C>,
        extra_ancestors: &[BindingId],
        transform: F,
    ) -> Result<&mut Self>
    where
        C: PropertyValue,
        F: Fn(G, &[Value]) -> C + 'static,
    {
        let transform: Transform = Rc::new(move |values: &[Value]| {
            let group = values.first().cloned().map(G::coerce).unwrap_or_else(G::default_value);
            let extras = values.get(1..).unwrap_or_default();
            transform(group, extras).into_value()
        });
        let child = PresetChild {
            node: child.id(),
            extra_ancestors: extra_ancestors.iter().copied().collect(),
            transform,
        };
        let wired = if self.enabled {
            self.wire(graph, &child)
        } else {
            Ok(())
        };
        self.children.push(child);
        wired?;
        Ok(self)
    }

    pub fn children_len(&self) -> usize {
        self.children.len()
    }

    fn wire(&self, graph: &mut BindingGraph, child: &PresetChild) -> Result<()> {
        let mut ancestors: SmallVec<[BindingId; 4]> = SmallVec::with_capacity(child.extra_ancestors.len() + 1);
        ancestors.push(self.binding.id());
        ancestors.extend(child.extra_ancestors.iter().copied());
        graph.connect_dynamic(child.node, &ancestors, child.transform.clone(), None)
    }
}
