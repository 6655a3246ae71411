//! Reactive property bindings
//!
//! A [`BindingGraph`] owns every binding (property node). A binding holds a
//! current value, the value it is transitioning away from, and optionally a
//! transform over an ordered list of ancestor bindings:
//!
//! - `set` writes a plain binding and synchronously recomputes every
//!   descendant, depth first, before returning
//! - `connect` replaces a binding's wiring and seeds its value immediately
//! - `get` returns the raw value; `get_interpolated` blends previous to
//!   current through the binding's transition
//!
//! ```ignore
//! use tether_core::{BindingGraph, Ease, Length};
//! use std::rc::Rc;
//!
//! let mut graph = BindingGraph::new();
//! let width = graph.create_with(Length::Px(0.0));
//! let half = graph.create::<Length>();
//!
//! graph.connect(half, width, |w| w / 2.0, Some(Rc::new(Ease::new(300.0))))?;
//! graph.set(width, Length::Px(100.0))?;
//!
//! assert_eq!(graph.get(half)?, Length::Px(50.0));
//! ```
//!
//! Nodes live in a generation-checked arena, so an id that outlives its
//! node fails with [`BindingError::UnknownBinding`] instead of aliasing a
//! newer node.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::ancestors::Ancestors;
use crate::clock::{Clock, SystemClock};
use crate::config::RuntimeConfig;
use crate::error::{BindingError, Result};
use crate::transition::{CubicBezier, Ease, TransitionRef};
use crate::value::{PropertyValue, Value, ValueKind};

new_key_type! {
    /// Unique identifier for a binding
    pub struct BindingId;
}

impl BindingId {
    /// Convert to raw u64 for transport across a boundary
    pub fn to_raw(&self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Reconstruct from raw u64
    pub fn from_raw(raw: u64) -> Self {
        slotmap::KeyData::from_ffi(raw).into()
    }
}

/// Transform from ancestor values (in ancestor order) to a new value
pub type Transform = Rc<dyn Fn(&[Value]) -> Value>;

/// Change listener, called with `(previous, current)` after every write
pub type Listener = Rc<dyn Fn(&Value, &Value)>;

/// Typed binding handle (cheap to copy)
#[derive(Debug)]
pub struct Binding<T> {
    id: BindingId,
    _marker: PhantomData<T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Binding<T> {}

impl<T> PartialEq for Binding<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Binding<T> {}

impl<T> Binding<T> {
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Reconstruct a typed handle from a raw id.
    ///
    /// The caller must ensure the id refers to a binding of kind `T`; reads
    /// through a mismatched handle coerce rather than fail.
    pub fn from_id(id: BindingId) -> Self {
        Binding {
            id,
            _marker: PhantomData,
        }
    }
}

impl<T> From<Binding<T>> for BindingId {
    fn from(binding: Binding<T>) -> Self {
        binding.id
    }
}

/// Who is writing a value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriteOrigin {
    /// Application code; subject to the write guards
    External,
    /// Propagation from ancestors; bypasses the write guards
    Recompute,
}

/// Internal binding storage
struct BindingNode {
    kind: ValueKind,
    value: Value,
    /// Value at the moment of the last write, blended if mid-transition
    previous: Option<Value>,
    /// Clock time of the last write
    changed_at: f64,
    transition: Option<TransitionRef>,
    /// Ordered; the transform receives values in this order
    ancestors: SmallVec<[BindingId; 4]>,
    /// Insertion ordered, no duplicates
    descendants: SmallVec<[BindingId; 4]>,
    transform: Option<Transform>,
    computed: bool,
    frozen: bool,
    listener: Option<Listener>,
}

impl BindingNode {
    fn new(kind: ValueKind, value: Value, transition: Option<TransitionRef>) -> Self {
        Self {
            kind,
            value: kind.coerce(value),
            previous: None,
            changed_at: 0.0,
            transition,
            ancestors: SmallVec::new(),
            descendants: SmallVec::new(),
            transform: None,
            computed: false,
            frozen: false,
            listener: None,
        }
    }

    fn read(&self, interpolate: bool, now: f64) -> Value {
        if !interpolate {
            return self.value.clone();
        }
        let (Some(transition), Some(previous)) = (&self.transition, &self.previous) else {
            return self.value.clone();
        };
        let progress = transition.interpolate(self.changed_at, now);
        if progress >= 1.0 {
            self.value.clone()
        } else if progress <= 0.0 {
            previous.clone()
        } else {
            self.kind.interpolate(previous, &self.value, progress)
        }
    }
}

/// Owner of every binding and of the wiring between them
pub struct BindingGraph {
    nodes: SlotMap<BindingId, BindingNode>,
    clock: Rc<dyn Clock>,
    config: RuntimeConfig,
}

impl BindingGraph {
    /// Create a graph on the system clock with default configuration
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default(), Rc::new(SystemClock::new()))
    }

    /// Create a graph reading time from `clock`
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self::with_config(RuntimeConfig::default(), clock)
    }

    pub fn with_config(config: RuntimeConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current time on the graph's clock
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Standard ease transition using the configured sample count
    pub fn ease(&self, duration_ms: f64) -> TransitionRef {
        Rc::new(Ease::with_samples(self.config.easing.sample_count, duration_ms))
    }

    /// Bezier transition using the configured sample count
    pub fn cubic_bezier(&self, duration_ms: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> TransitionRef {
        Rc::new(CubicBezier::with_samples(
            self.config.easing.sample_count,
            duration_ms,
            x1,
            y1,
            x2,
            y2,
        ))
    }

    // =========================================================================
    // CREATION
    // =========================================================================

    /// Create a binding holding the kind's default value
    pub fn create<T: PropertyValue>(&mut self) -> Binding<T> {
        self.create_with(T::default_value())
    }

    pub fn create_with<T: PropertyValue>(&mut self, initial: T) -> Binding<T> {
        Binding::from_id(self.insert(T::KIND, initial.into_value(), None))
    }

    pub fn create_with_transition<T: PropertyValue>(
        &mut self,
        initial: T,
        transition: TransitionRef,
    ) -> Binding<T> {
        Binding::from_id(self.insert(T::KIND, initial.into_value(), Some(transition)))
    }

    /// Create an untyped binding of `kind` holding its default value
    pub fn create_dynamic(&mut self, kind: ValueKind) -> BindingId {
        self.insert(kind, kind.default_value(), None)
    }

    fn insert(&mut self, kind: ValueKind, value: Value, transition: Option<TransitionRef>) -> BindingId {
        let id = self.nodes.insert(BindingNode::new(kind, value, transition));
        tracing::trace!(?id, %kind, "created binding");
        id
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Raw current value
    pub fn get<T: PropertyValue>(&self, binding: Binding<T>) -> Result<T> {
        self.get_value(binding.id, false).map(T::coerce)
    }

    /// Current value blended from the previous one through the transition
    pub fn get_interpolated<T: PropertyValue>(&self, binding: Binding<T>) -> Result<T> {
        self.get_value(binding.id, true).map(T::coerce)
    }

    pub fn get_value(&self, id: BindingId, interpolate: bool) -> Result<Value> {
        let node = self.node(id)?;
        Ok(node.read(interpolate, self.clock.now_ms()))
    }

    pub fn previous_value(&self, id: BindingId) -> Result<Option<Value>> {
        Ok(self.node(id)?.previous.clone())
    }

    pub fn kind(&self, id: BindingId) -> Result<ValueKind> {
        Ok(self.node(id)?.kind)
    }

    pub fn is_computed(&self, id: BindingId) -> Result<bool> {
        Ok(self.node(id)?.computed)
    }

    pub fn is_frozen(&self, id: BindingId) -> Result<bool> {
        Ok(self.node(id)?.frozen)
    }

    pub fn transition(&self, id: BindingId) -> Result<Option<TransitionRef>> {
        Ok(self.node(id)?.transition.clone())
    }

    pub fn ancestors(&self, id: BindingId) -> Result<&[BindingId]> {
        Ok(&self.node(id)?.ancestors)
    }

    pub fn descendants(&self, id: BindingId) -> Result<&[BindingId]> {
        Ok(&self.node(id)?.descendants)
    }

    pub fn contains(&self, id: BindingId) -> bool {
        self.nodes.contains_key(id)
    }

    fn node(&self, id: BindingId) -> Result<&BindingNode> {
        self.nodes.get(id).ok_or(BindingError::UnknownBinding(id))
    }

    fn node_mut(&mut self, id: BindingId) -> Result<&mut BindingNode> {
        self.nodes.get_mut(id).ok_or(BindingError::UnknownBinding(id))
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Write a plain binding and propagate to its descendants
    pub fn set<T: PropertyValue>(&mut self, binding: Binding<T>, value: T) -> Result<()> {
        self.write(binding.id, value.into_value(), WriteOrigin::External)
    }

    /// Write a value of any kind; it is coerced to the binding's kind
    pub fn set_value(&mut self, id: BindingId, value: Value) -> Result<()> {
        self.write(id, value, WriteOrigin::External)
    }

    /// Set or clear the transition used by interpolated reads
    pub fn set_transition(&mut self, id: BindingId, transition: Option<TransitionRef>) -> Result<()> {
        self.node_mut(id)?.transition = transition;
        Ok(())
    }

    /// Register the change listener, replacing any previous one
    pub fn on_change<F>(&mut self, id: BindingId, listener: F) -> Result<()>
    where
        F: Fn(&Value, &Value) + 'static,
    {
        self.node_mut(id)?.listener = Some(Rc::new(listener));
        Ok(())
    }

    pub fn clear_listener(&mut self, id: BindingId) -> Result<()> {
        self.node_mut(id)?.listener = None;
        Ok(())
    }

    /// Permanently reject further `set`, `connect` and `disconnect`
    pub fn freeze(&mut self, id: BindingId) -> Result<()> {
        self.node_mut(id)?.frozen = true;
        tracing::debug!(?id, "froze binding");
        Ok(())
    }

    fn write(&mut self, id: BindingId, value: Value, origin: WriteOrigin) -> Result<()> {
        let now = self.clock.now_ms();
        let node = self.node_mut(id)?;

        if origin == WriteOrigin::External {
            if node.frozen {
                return Err(BindingError::ReadonlyViolation(id));
            }
            if node.computed {
                return Err(BindingError::DirectWriteOnComputed(id));
            }
        }

        let previous = node.read(true, now);
        node.value = node.kind.coerce(value);
        node.previous = Some(previous.clone());
        node.changed_at = now;

        let current = node.value.clone();
        let listener = node.listener.clone();
        let descendants = node.descendants.clone();

        tracing::trace!(?id, ?origin, %current, "binding changed");

        if let Some(listener) = listener {
            listener(&previous, &current);
        }
        for descendant in descendants {
            self.recompute(descendant);
        }
        Ok(())
    }

    /// Pull fresh ancestor values through the transform
    fn recompute(&mut self, id: BindingId) {
        let Some(node) = self.nodes.get(id) else {
            tracing::warn!(?id, "skipping recompute of removed binding");
            return;
        };
        let Some(transform) = node.transform.clone() else {
            return;
        };

        let mut inputs: SmallVec<[Value; 4]> = SmallVec::with_capacity(node.ancestors.len());
        for ancestor in &node.ancestors {
            match self.nodes.get(*ancestor) {
                Some(a) => inputs.push(a.value.clone()),
                None => {
                    tracing::warn!(?id, ?ancestor, "skipping recompute with removed ancestor");
                    return;
                }
            }
        }

        let value = transform(&inputs);
        // the node was looked up above and nothing in between can remove it
        let _ = self.write(id, value, WriteOrigin::Recompute);
    }

    // =========================================================================
    // WIRING
    // =========================================================================

    /// Derive `binding` from typed ancestors.
    ///
    /// `ancestors` is a single binding, a tuple of up to four bindings, or a
    /// `Vec` of same-kind bindings; the transform receives the matching
    /// value, tuple or `Vec`.
    pub fn connect<T, A, F>(
        &mut self,
        binding: Binding<T>,
        ancestors: A,
        transform: F,
        transition: Option<TransitionRef>,
    ) -> Result<()>
    where
        T: PropertyValue,
        A: Ancestors,
        F: Fn(A::Values) -> T + 'static,
    {
        let ids = ancestors.ids();
        let transform: Transform =
            Rc::new(move |values: &[Value]| transform(A::values(values)).into_value());
        self.connect_dynamic(binding.id, &ids, transform, transition)
    }

    /// Make `binding` follow `source`, coerced to the binding's kind
    pub fn mirror<T: PropertyValue>(
        &mut self,
        binding: Binding<T>,
        source: BindingId,
        transition: Option<TransitionRef>,
    ) -> Result<()> {
        let identity: Transform =
            Rc::new(|values: &[Value]| values.first().cloned().unwrap_or(Value::Boolean(false)));
        self.connect_dynamic(binding.id, &[source], identity, transition)
    }

    /// Replace the wiring of `id` and seed its value from the new ancestors.
    ///
    /// Fails with `ReadonlyViolation` when `id` is frozen, `UnknownBinding`
    /// when any ancestor is gone and `CycleRejected` when `id` is reachable
    /// from the ancestors. On failure the previous wiring is untouched.
    pub fn connect_dynamic(
        &mut self,
        id: BindingId,
        ancestors: &[BindingId],
        transform: Transform,
        transition: Option<TransitionRef>,
    ) -> Result<()> {
        if self.node(id)?.frozen {
            return Err(BindingError::ReadonlyViolation(id));
        }
        for ancestor in ancestors {
            self.node(*ancestor)?;
        }
        if self.reaches(ancestors, id) {
            tracing::debug!(?id, ?ancestors, "rejected cyclic connect");
            return Err(BindingError::CycleRejected(id));
        }

        self.detach(id);
        for ancestor in ancestors {
            if let Some(node) = self.nodes.get_mut(*ancestor) {
                if !node.descendants.contains(&id) {
                    node.descendants.push(id);
                }
            }
        }

        let node = self.node_mut(id)?;
        node.ancestors = ancestors.iter().copied().collect();
        node.transform = Some(transform);
        node.transition = transition;
        node.computed = true;

        tracing::debug!(?id, ?ancestors, "connected binding");
        self.recompute(id);
        Ok(())
    }

    /// Drop the wiring of `id`; it keeps its value and becomes writable
    pub fn disconnect(&mut self, id: BindingId) -> Result<()> {
        if self.node(id)?.frozen {
            return Err(BindingError::ReadonlyViolation(id));
        }
        self.detach(id);
        tracing::debug!(?id, "disconnected binding");
        Ok(())
    }

    /// Remove a binding for good.
    ///
    /// Descendants are detached and keep their last value. The id is stale
    /// afterwards.
    pub fn remove(&mut self, id: BindingId) -> Result<()> {
        self.detach(id);
        let node = self
            .nodes
            .remove(id)
            .ok_or(BindingError::UnknownBinding(id))?;
        for descendant in node.descendants {
            self.detach(descendant);
        }
        tracing::debug!(?id, "removed binding");
        Ok(())
    }

    /// Unlink `id` from its ancestors in both directions
    fn detach(&mut self, id: BindingId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let ancestors = std::mem::take(&mut node.ancestors);
        node.transform = None;
        node.computed = false;

        for ancestor in ancestors {
            if let Some(a) = self.nodes.get_mut(ancestor) {
                a.descendants.retain(|d| *d != id);
            }
        }
    }

    /// Whether `target` is among `from` or their transitive ancestors
    fn reaches(&self, from: &[BindingId], target: BindingId) -> bool {
        let mut visited: FxHashSet<BindingId> = FxHashSet::default();
        let mut stack: Vec<BindingId> = from.to_vec();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.ancestors.iter().copied());
            }
        }
        false
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.nodes.len(),
            ..GraphStats::default()
        };
        for node in self.nodes.values() {
            stats.computed_count += node.computed as usize;
            stats.frozen_count += node.frozen as usize;
            stats.edge_count += node.ancestors.len();
        }
        stats
    }
}

impl Default for BindingGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindingGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingGraph")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Statistics about the binding graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub node_count: usize,
    pub computed_count: usize,
    pub frozen_count: usize,
    /// Ancestor links, counted once per ancestor list entry
    pub edge_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::length::Length;
    use crate::transition::Linear;
    use std::cell::RefCell;

    fn manual_graph() -> (BindingGraph, ManualClock) {
        let clock = ManualClock::new();
        (BindingGraph::with_clock(Rc::new(clock.clone())), clock)
    }

    #[test]
    fn test_create_get_set() {
        let mut graph = BindingGraph::new();
        let count = graph.create::<i32>();
        assert_eq!(graph.get(count).unwrap(), 0);

        graph.set(count, 42).unwrap();
        assert_eq!(graph.get(count).unwrap(), 42);
    }

    #[test]
    fn test_set_value_coerces() {
        let mut graph = BindingGraph::new();
        let count = graph.create::<i32>();
        graph.set_value(count.id(), Value::Float(7.8)).unwrap();
        assert_eq!(graph.get(count).unwrap(), 7);

        let dynamic = graph.create_dynamic(ValueKind::Length);
        graph.set_value(dynamic, Value::Int(12)).unwrap();
        assert_eq!(
            graph.get_value(dynamic, false).unwrap(),
            Value::Length(Length::Px(12.0))
        );
    }

    #[test]
    fn test_connect_seeds_immediately() {
        let mut graph = BindingGraph::new();
        let a = graph.create_with(2.0f64);
        let b = graph.create_with(3.0f64);
        let sum = graph.create::<f64>();

        graph.connect(sum, (a, b), |(a, b)| a + b, None).unwrap();
        assert_eq!(graph.get(sum).unwrap(), 5.0);
        assert!(graph.is_computed(sum.id()).unwrap());

        graph.set(a, 10.0).unwrap();
        assert_eq!(graph.get(sum).unwrap(), 13.0);
    }

    #[test]
    fn test_chain_propagates_depth_first() {
        let mut graph = BindingGraph::new();
        let a = graph.create_with(1i32);
        let b = graph.create::<i32>();
        let c = graph.create::<i32>();
        graph.connect(b, a, |a| a * 2, None).unwrap();
        graph.connect(c, b, |b| b + 1, None).unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        for (name, id) in [("a", a.id()), ("b", b.id()), ("c", c.id())] {
            let order = order.clone();
            graph
                .on_change(id, move |_, cur| order.borrow_mut().push(format!("{name}={cur}")))
                .unwrap();
        }

        graph.set(a, 5).unwrap();
        assert_eq!(graph.get(c).unwrap(), 11);
        assert_eq!(*order.borrow(), vec!["a=5", "b=10", "c=11"]);
    }

    #[test]
    fn test_diamond_recomputes_per_path() {
        let mut graph = BindingGraph::new();
        let root = graph.create_with(1i32);
        let left = graph.create::<i32>();
        let right = graph.create::<i32>();
        let join = graph.create::<i32>();
        graph.connect(left, root, |r| r + 1, None).unwrap();
        graph.connect(right, root, |r| r * 10, None).unwrap();
        graph.connect(join, (left, right), |(l, r)| l + r, None).unwrap();

        let runs = Rc::new(RefCell::new(0));
        let counter = runs.clone();
        graph
            .on_change(join.id(), move |_, _| *counter.borrow_mut() += 1)
            .unwrap();

        graph.set(root, 2).unwrap();
        assert_eq!(graph.get(join).unwrap(), 23);
        assert_eq!(*runs.borrow(), 2);
    }

    #[test]
    fn test_computed_rejects_external_set() {
        let mut graph = BindingGraph::new();
        let a = graph.create_with(1i32);
        let m = graph.create::<i32>();
        graph.mirror(m, a.id(), None).unwrap();

        assert_eq!(
            graph.set(m, 9),
            Err(BindingError::DirectWriteOnComputed(m.id()))
        );
        graph.set(a, 4).unwrap();
        assert_eq!(graph.get(m).unwrap(), 4);
    }

    #[test]
    fn test_frozen_rejects_writes_and_wiring() {
        let mut graph = BindingGraph::new();
        let a = graph.create::<bool>();
        let n = graph.create::<bool>();
        graph.freeze(n.id()).unwrap();

        assert_eq!(graph.set(n, true), Err(BindingError::ReadonlyViolation(n.id())));
        assert_eq!(
            graph.connect(n, a, |a| a, None),
            Err(BindingError::ReadonlyViolation(n.id()))
        );
        assert_eq!(
            graph.disconnect(n.id()),
            Err(BindingError::ReadonlyViolation(n.id()))
        );
    }

    #[test]
    fn test_frozen_computed_still_recomputes() {
        let mut graph = BindingGraph::new();
        let a = graph.create_with(1i32);
        let m = graph.create::<i32>();
        graph.mirror(m, a.id(), None).unwrap();
        graph.freeze(m.id()).unwrap();

        graph.set(a, 3).unwrap();
        assert_eq!(graph.get(m).unwrap(), 3);
    }

    #[test]
    fn test_disconnect_makes_writable() {
        let mut graph = BindingGraph::new();
        let a = graph.create_with(1i32);
        let m = graph.create::<i32>();
        graph.mirror(m, a.id(), None).unwrap();

        graph.disconnect(m.id()).unwrap();
        assert!(!graph.is_computed(m.id()).unwrap());
        assert!(graph.descendants(a.id()).unwrap().is_empty());
        assert_eq!(graph.get(m).unwrap(), 1);

        graph.set(m, 8).unwrap();
        graph.set(a, 2).unwrap();
        assert_eq!(graph.get(m).unwrap(), 8);
    }

    #[test]
    fn test_connect_replaces_wiring() {
        let mut graph = BindingGraph::new();
        let a = graph.create_with(1i32);
        let b = graph.create_with(100i32);
        let m = graph.create::<i32>();
        graph.mirror(m, a.id(), None).unwrap();
        graph.mirror(m, b.id(), None).unwrap();

        assert_eq!(graph.ancestors(m.id()).unwrap(), &[b.id()]);
        assert!(graph.descendants(a.id()).unwrap().is_empty());
        graph.set(a, 5).unwrap();
        assert_eq!(graph.get(m).unwrap(), 100);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut graph = BindingGraph::new();
        let a = graph.create::<i32>();
        let b = graph.create::<i32>();
        let c = graph.create::<i32>();

        graph.mirror(a, b.id(), None).unwrap();
        graph.mirror(b, c.id(), None).unwrap();
        assert_eq!(
            graph.mirror(c, a.id(), None),
            Err(BindingError::CycleRejected(c.id()))
        );
        assert_eq!(
            graph.mirror(a, a.id(), None),
            Err(BindingError::CycleRejected(a.id()))
        );
        // prior wiring survives the rejected call
        assert_eq!(graph.ancestors(a.id()).unwrap(), &[b.id()]);
        assert!(!graph.is_computed(c.id()).unwrap());
    }

    #[test]
    fn test_unknown_ancestor_rejected() {
        let mut graph = BindingGraph::new();
        let gone = graph.create::<i32>();
        let m = graph.create::<i32>();
        graph.remove(gone.id()).unwrap();

        assert_eq!(
            graph.mirror(m, gone.id(), None),
            Err(BindingError::UnknownBinding(gone.id()))
        );
        assert_eq!(graph.get(gone), Err(BindingError::UnknownBinding(gone.id())));
    }

    #[test]
    fn test_remove_detaches_descendants() {
        let mut graph = BindingGraph::new();
        let a = graph.create_with(1i32);
        let b = graph.create_with(2i32);
        let m = graph.create::<i32>();
        graph.connect(m, (a, b), |(a, b)| a + b, None).unwrap();

        graph.remove(a.id()).unwrap();
        assert!(!graph.contains(a.id()));
        assert!(!graph.is_computed(m.id()).unwrap());
        assert!(graph.descendants(b.id()).unwrap().is_empty());
        assert_eq!(graph.get(m).unwrap(), 3);

        graph.set(m, 10).unwrap();
        assert_eq!(graph.get(m).unwrap(), 10);
    }

    #[test]
    fn test_transition_blends_previous_to_current() {
        let (mut graph, clock) = manual_graph();
        let x = graph.create_with_transition(0.0f64, Rc::new(Linear::new(1000.0)));

        graph.set(x, 100.0).unwrap();
        assert_eq!(graph.get(x).unwrap(), 100.0);
        assert_eq!(graph.get_interpolated(x).unwrap(), 0.0);

        clock.advance(250.0);
        assert_eq!(graph.get_interpolated(x).unwrap(), 25.0);

        clock.advance(750.0);
        assert_eq!(graph.get_interpolated(x).unwrap(), 100.0);
    }

    #[test]
    fn test_interrupted_transition_starts_from_blend() {
        let (mut graph, clock) = manual_graph();
        let x = graph.create_with_transition(0.0f64, Rc::new(Linear::new(1000.0)));

        graph.set(x, 100.0).unwrap();
        clock.advance(500.0);
        graph.set(x, 200.0).unwrap();

        assert_eq!(graph.previous_value(x.id()).unwrap(), Some(Value::Float(50.0)));
        assert_eq!(graph.get_interpolated(x).unwrap(), 50.0);
        clock.advance(500.0);
        assert_eq!(graph.get_interpolated(x).unwrap(), 125.0);
    }

    #[test]
    fn test_listener_receives_previous_and_current() {
        let mut graph = BindingGraph::new();
        let name = graph.create_with(String::from("a"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        graph
            .on_change(name.id(), move |prev, cur| {
                sink.borrow_mut().push((prev.clone(), cur.clone()))
            })
            .unwrap();

        graph.set(name, "b".to_string()).unwrap();
        graph.set(name, "b".to_string()).unwrap();
        graph.clear_listener(name.id()).unwrap();
        graph.set(name, "c".to_string()).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (Value::from("a"), Value::from("b")));
        assert_eq!(seen[1], (Value::from("b"), Value::from("b")));
    }

    #[test]
    fn test_raw_ids_round_trip() {
        let mut graph = BindingGraph::new();
        let a = graph.create::<i32>();
        let raw = a.id().to_raw();
        assert_eq!(BindingId::from_raw(raw), a.id());
    }

    #[test]
    fn test_stats() {
        let mut graph = BindingGraph::new();
        let a = graph.create::<i32>();
        let b = graph.create::<i32>();
        let m = graph.create::<i32>();
        graph.connect(m, (a, b), |(a, b)| a - b, None).unwrap();
        graph.freeze(a.id()).unwrap();

        let stats = graph.stats();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.computed_count, 1);
        assert_eq!(stats.frozen_count, 1);
        assert_eq!(stats.edge_count, 2);
    }
}
