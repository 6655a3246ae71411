//! Engine-side property store
//!
//! The engine owns the binding graph and every property exported across
//! the boundary. Observers never see a [`BindingId`]; they hold a
//! [`PropertyHandle`] and go through a [`KindTable`](crate::table::KindTable).
//!
//! Every exported property records itself in the engine's change set when it
//! changes. A [`CommitQueue`] drains that set later and sends each changed
//! property's latest value to its notify callback.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexSet;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tether_core::{
    BindingGraph, BindingId, Clock, RuntimeConfig, SystemClock, Transform, Value, ValueKind,
};

use crate::commit::CommitQueue;
use crate::error::{BridgeError, Result};
use crate::handle::{Handle, NULL_HANDLE};
use crate::host::{Host, HostFunction};
use crate::seq::WeakRef;
use crate::wire::WireValue;

new_key_type! {
    /// Handle of a property exported across the boundary
    pub struct PropertyHandle;
}

impl PropertyHandle {
    pub fn to_raw(&self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    pub fn from_raw(raw: u64) -> Self {
        slotmap::KeyData::from_ffi(raw).into()
    }
}

struct ExportedProperty {
    binding: BindingId,
    kind: ValueKind,
    notify: Option<Rc<HostFunction>>,
}

/// Engine shared between the observer-side proxies and the commit queue
pub type SharedEngine = Rc<RefCell<BridgeEngine>>;

/// Notification waiting to be sent by a flush
pub(crate) type PendingNotify = (Rc<HostFunction>, WireValue);

pub struct BridgeEngine {
    graph: BindingGraph,
    properties: SlotMap<PropertyHandle, ExportedProperty>,
    host: Rc<dyn Host>,
    changes: Rc<RefCell<IndexSet<PropertyHandle>>>,
    commit: Option<CommitQueue>,
}

impl BridgeEngine {
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self::with_config(host, RuntimeConfig::default(), Rc::new(SystemClock::new()))
    }

    pub fn with_config(host: Rc<dyn Host>, config: RuntimeConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            graph: BindingGraph::with_config(config, clock),
            properties: SlotMap::with_key(),
            host,
            changes: Rc::new(RefCell::new(IndexSet::new())),
            commit: None,
        }
    }

    /// Route change notifications of properties created from now on
    pub fn attach_commit(&mut self, commit: CommitQueue) {
        self.commit = Some(commit);
    }

    pub fn graph(&self) -> &BindingGraph {
        &self.graph
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Graph node behind `handle`
    pub fn binding(&self, handle: PropertyHandle) -> Result<BindingId> {
        Ok(self.property(handle)?.binding)
    }

    fn property(&self, handle: PropertyHandle) -> Result<&ExportedProperty> {
        self.properties
            .get(handle)
            .ok_or(BridgeError::UnknownHandle(handle.to_raw()))
    }

    // =========================================================================
    // PROPERTY OPERATIONS
    // =========================================================================

    /// Export a new property of `kind`. `notify` may be [`NULL_HANDLE`].
    pub fn create(&mut self, kind: ValueKind, notify: Handle) -> PropertyHandle {
        let binding = self.graph.create_dynamic(kind);
        let notify = (notify != NULL_HANDLE)
            .then(|| Rc::new(HostFunction::new(notify, self.host.clone())));
        let handle = self.properties.insert(ExportedProperty {
            binding,
            kind,
            notify,
        });

        let changes = self.changes.clone();
        let commit = self.commit.clone();
        let listener = move |_: &Value, _: &Value| {
            changes.borrow_mut().insert(handle);
            if let Some(commit) = &commit {
                commit.request();
            }
        };
        if let Err(err) = self.graph.on_change(binding, listener) {
            tracing::warn!(%err, "failed to observe exported property");
        }

        tracing::debug!(?handle, ?binding, %kind, "exported property");
        handle
    }

    pub fn get(&self, handle: PropertyHandle, interpolate: bool) -> Result<WireValue> {
        let value = self.graph.get_value(self.binding(handle)?, interpolate)?;
        Ok(WireValue::from_value(&value))
    }

    /// Write a value; its tag must match the property's kind
    pub fn set(&mut self, handle: PropertyHandle, value: &WireValue) -> Result<()> {
        let property = self.property(handle)?;
        let (binding, kind) = (property.binding, property.kind);
        let value = value.to_value()?;
        if value.kind() != kind {
            return Err(BridgeError::KindMismatch {
                expected: kind,
                found: value.kind(),
            });
        }
        self.graph.set_value(binding, value)?;
        Ok(())
    }

    pub fn weakref(&self, handle: PropertyHandle) -> Result<WeakRef> {
        Ok(WeakRef::from_binding(self.binding(handle)?))
    }

    pub fn freeze(&mut self, handle: PropertyHandle) -> Result<()> {
        let binding = self.binding(handle)?;
        self.graph.freeze(binding)?;
        Ok(())
    }

    /// Derive a property from `parents` through the host callback `transform`.
    ///
    /// The callback receives the parents' values as wire values and its
    /// result is coerced to the property's kind. A callback that fails or
    /// answers with an unrecognized tag is a protocol violation and panics.
    ///
    /// `transform` is released on every failure path.
    pub fn bind(&mut self, handle: PropertyHandle, parents: &[WeakRef], transform: Handle) -> Result<()> {
        if transform == NULL_HANDLE {
            return Err(BridgeError::UnknownHandle(NULL_HANDLE as u64));
        }
        let function = HostFunction::new(transform, self.host.clone());
        let property = self.property(handle)?;
        let (binding, kind) = (property.binding, property.kind);

        let ancestors: SmallVec<[BindingId; 4]> = parents.iter().map(|p| p.binding()).collect();
        let transform: Transform = Rc::new(move |values: &[Value]| {
            let args = values.iter().map(WireValue::from_value).collect();
            match function.call(args).and_then(|result| result.to_value()) {
                Ok(value) => kind.coerce(value),
                Err(err) => {
                    tracing::error!(%err, handle = function.handle(), "host transform failed");
                    panic!("host transform {} failed: {err}", function.handle());
                }
            }
        });

        self.graph.connect_dynamic(binding, &ancestors, transform, None)?;
        Ok(())
    }

    pub fn unbind(&mut self, handle: PropertyHandle) -> Result<()> {
        let binding = self.binding(handle)?;
        self.graph.disconnect(binding)?;
        Ok(())
    }

    /// Remove the property and its node; releases its callback handles
    pub fn drop_property(&mut self, handle: PropertyHandle) -> Result<()> {
        let property = self
            .properties
            .remove(handle)
            .ok_or(BridgeError::UnknownHandle(handle.to_raw()))?;
        self.changes.borrow_mut().shift_remove(&handle);
        self.graph.remove(property.binding)?;
        tracing::debug!(?handle, "dropped property");
        Ok(())
    }

    // =========================================================================
    // COMMIT
    // =========================================================================

    /// Properties changed since the last drain
    pub fn pending_changes(&self) -> usize {
        self.changes.borrow().len()
    }

    /// Drain the change set into notifications carrying each latest value
    pub(crate) fn take_notifications(&self) -> Vec<PendingNotify> {
        let changed: Vec<PropertyHandle> = self.changes.borrow_mut().drain(..).collect();
        changed
            .into_iter()
            .filter_map(|handle| {
                let property = self.properties.get(handle)?;
                let notify = property.notify.clone()?;
                match self.graph.get_value(property.binding, false) {
                    Ok(value) => Some((notify, WireValue::from_value(&value))),
                    Err(err) => {
                        tracing::warn!(?handle, %err, "skipping notify of stale property");
                        None
                    }
                }
            })
            .collect()
    }
}

impl fmt::Debug for BridgeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeEngine")
            .field("graph", &self.graph)
            .field("properties", &self.properties.len())
            .field("pending_changes", &self.pending_changes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalHost;
    use tether_core::{BindingError, Length};

    fn engine() -> (BridgeEngine, Rc<LocalHost>) {
        let host = Rc::new(LocalHost::new());
        (BridgeEngine::new(host.clone()), host)
    }

    #[test]
    fn test_create_starts_at_kind_default() {
        let (mut engine, _) = engine();
        let handle = engine.create(ValueKind::Length, NULL_HANDLE);
        let value = engine.get(handle, false).unwrap();
        assert_eq!(value.unwrap::<Length>().unwrap(), Length::Px(0.0));
    }

    #[test]
    fn test_set_rejects_other_kinds() {
        let (mut engine, _) = engine();
        let handle = engine.create(ValueKind::Int, NULL_HANDLE);
        assert_eq!(
            engine.set(handle, &WireValue::wrap(true)),
            Err(BridgeError::KindMismatch {
                expected: ValueKind::Int,
                found: ValueKind::Boolean
            })
        );
        engine.set(handle, &WireValue::wrap(4)).unwrap();
        assert_eq!(engine.pending_changes(), 1);
    }

    #[test]
    fn test_bind_dispatches_through_host() {
        let (mut engine, host) = engine();
        let a = engine.create(ValueKind::Int, NULL_HANDLE);
        let b = engine.create(ValueKind::Int, NULL_HANDLE);
        let sum = engine.create(ValueKind::Int, NULL_HANDLE);

        let add = host.register(|args| {
            let total: i32 = args.iter().filter_map(|a| a.unwrap::<i32>().ok()).sum();
            WireValue::wrap(total)
        });
        let parents = [engine.weakref(a).unwrap(), engine.weakref(b).unwrap()];
        engine.bind(sum, &parents, add).unwrap();

        engine.set(a, &WireValue::wrap(2)).unwrap();
        engine.set(b, &WireValue::wrap(5)).unwrap();
        assert_eq!(engine.get(sum, false).unwrap().unwrap::<i32>().unwrap(), 7);

        engine.unbind(sum).unwrap();
        assert_eq!(host.live_functions(), 0);
    }

    #[test]
    fn test_rejected_bind_releases_transform() {
        let (mut engine, host) = engine();
        let a = engine.create(ValueKind::Float, NULL_HANDLE);
        engine.freeze(a).unwrap();

        let f = host.register(|_| WireValue::wrap(1.0));
        let own = engine.weakref(a).unwrap();
        assert_eq!(
            engine.bind(a, &[own], f),
            Err(BridgeError::Binding(BindingError::ReadonlyViolation(
                engine.binding(a).unwrap()
            )))
        );
        assert_eq!(host.live_functions(), 0);
    }

    #[test]
    fn test_bind_on_dropped_property_releases_transform() {
        let (mut engine, host) = engine();
        let a = engine.create(ValueKind::Int, NULL_HANDLE);
        let stale = engine.create(ValueKind::Int, NULL_HANDLE);
        let parent = engine.weakref(a).unwrap();
        engine.drop_property(stale).unwrap();

        let f = host.register(|_| WireValue::wrap(0));
        assert_eq!(
            engine.bind(stale, &[parent], f),
            Err(BridgeError::UnknownHandle(stale.to_raw()))
        );
        assert_eq!(host.live_functions(), 0);
    }

    #[test]
    fn test_bind_to_removed_parent_releases_transform() {
        let (mut engine, host) = engine();
        let gone = engine.create(ValueKind::Int, NULL_HANDLE);
        let target = engine.create(ValueKind::Int, NULL_HANDLE);
        let parent = engine.weakref(gone).unwrap();
        engine.drop_property(gone).unwrap();

        let f = host.register(|_| WireValue::wrap(0));
        assert!(engine.bind(target, &[parent], f).is_err());
        assert_eq!(host.live_functions(), 0);
    }

    #[test]
    fn test_drop_property_releases_notify() {
        let (mut engine, host) = engine();
        let notify = host.register(|_| WireValue::wrap(false));
        let handle = engine.create(ValueKind::String, notify);
        engine.set(handle, &WireValue::wrap(String::from("x"))).unwrap();

        engine.drop_property(handle).unwrap();
        assert_eq!(engine.pending_changes(), 0);
        assert_eq!(host.live_functions(), 0);
        assert_eq!(
            engine.get(handle, false),
            Err(BridgeError::UnknownHandle(handle.to_raw()))
        );
    }

    #[test]
    fn test_notifications_carry_latest_value_once() {
        let (mut engine, host) = engine();
        let notify = host.register(|_| WireValue::wrap(false));
        let handle = engine.create(ValueKind::Int, notify);
        for n in 1..=3 {
            engine.set(handle, &WireValue::wrap(n)).unwrap();
        }

        let pending = engine.take_notifications();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1.unwrap::<i32>().unwrap(), 3);
        assert!(engine.take_notifications().is_empty());
    }
}
