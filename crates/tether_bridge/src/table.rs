//! Per-kind method tables
//!
//! Observers reach engine properties only through a [`KindTable`]: a flat
//! table of plain functions built once per value kind. Each entry takes the
//! engine, a property handle and wire values, and reports failure in a
//! [`BoundaryResult`] instead of returning it.

use std::fmt;

use tether_core::{Brush, Collection, Layout, Length, PropertyValue, ValueKind};

use crate::engine::{BridgeEngine, PropertyHandle};
use crate::handle::Handle;
use crate::result::BoundaryResult;
use crate::seq::{BoundarySeq, WeakRef};
use crate::wire::WireValue;

pub struct KindTable {
    pub kind: ValueKind,
    pub new: fn(&mut BridgeEngine, Handle) -> PropertyHandle,
    pub drop: fn(&mut BridgeEngine, PropertyHandle, &mut BoundaryResult),
    pub get: fn(&BridgeEngine, PropertyHandle, bool, &mut BoundaryResult) -> WireValue,
    pub set: fn(&mut BridgeEngine, PropertyHandle, &WireValue, &mut BoundaryResult),
    pub weakref: fn(&BridgeEngine, PropertyHandle, &mut BoundaryResult) -> WeakRef,
    pub freeze: fn(&mut BridgeEngine, PropertyHandle, &mut BoundaryResult),
    pub bind: fn(&mut BridgeEngine, PropertyHandle, &BoundarySeq<WeakRef>, Handle, &mut BoundaryResult),
    pub unbind: fn(&mut BridgeEngine, PropertyHandle, &mut BoundaryResult),
}

impl KindTable {
    pub const fn of<T: PropertyValue>() -> Self {
        Self {
            kind: T::KIND,
            new: new::<T>,
            drop: drop_property,
            get: get::<T>,
            set: set::<T>,
            weakref,
            freeze,
            bind,
            unbind,
        }
    }

    /// Table for a kind known only at runtime
    pub fn for_kind(kind: ValueKind) -> &'static KindTable {
        match kind {
            ValueKind::Boolean => &BOOLEAN_TABLE,
            ValueKind::Int => &INT_TABLE,
            ValueKind::Float => &FLOAT_TABLE,
            ValueKind::String => &STRING_TABLE,
            ValueKind::Length => &LENGTH_TABLE,
            ValueKind::Brush => &BRUSH_TABLE,
            ValueKind::Layout => &LAYOUT_TABLE,
            ValueKind::Collection => &COLLECTION_TABLE,
        }
    }
}

impl fmt::Debug for KindTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindTable").field("kind", &self.kind).finish()
    }
}

pub static BOOLEAN_TABLE: KindTable = KindTable::of::<bool>();
pub static INT_TABLE: KindTable = KindTable::of::<i32>();
pub static FLOAT_TABLE: KindTable = KindTable::of::<f64>();
pub static STRING_TABLE: KindTable = KindTable::of::<String>();
pub static LENGTH_TABLE: KindTable = KindTable::of::<Length>();
pub static BRUSH_TABLE: KindTable = KindTable::of::<Brush>();
pub static LAYOUT_TABLE: KindTable = KindTable::of::<Layout>();
pub static COLLECTION_TABLE: KindTable = KindTable::of::<Collection>();

fn new<T: PropertyValue>(engine: &mut BridgeEngine, notify: Handle) -> PropertyHandle {
    engine.create(T::KIND, notify)
}

fn drop_property(engine: &mut BridgeEngine, handle: PropertyHandle, result: &mut BoundaryResult) {
    result.record(engine.drop_property(handle));
}

fn get<T: PropertyValue>(
    engine: &BridgeEngine,
    handle: PropertyHandle,
    interpolate: bool,
    result: &mut BoundaryResult,
) -> WireValue {
    result
        .record(engine.get(handle, interpolate))
        .unwrap_or_else(|| WireValue::wrap(T::default_value()))
}

fn set<T: PropertyValue>(
    engine: &mut BridgeEngine,
    handle: PropertyHandle,
    value: &WireValue,
    result: &mut BoundaryResult,
) {
    if let Some(value) = result.record(value.unwrap::<T>()) {
        result.record(engine.set(handle, &WireValue::wrap(value)));
    }
}

fn weakref(engine: &BridgeEngine, handle: PropertyHandle, result: &mut BoundaryResult) -> WeakRef {
    result.record(engine.weakref(handle)).unwrap_or(WeakRef(0))
}

fn freeze(engine: &mut BridgeEngine, handle: PropertyHandle, result: &mut BoundaryResult) {
    result.record(engine.freeze(handle));
}

fn bind(
    engine: &mut BridgeEngine,
    handle: PropertyHandle,
    parents: &BoundarySeq<WeakRef>,
    transform: Handle,
    result: &mut BoundaryResult,
) {
    result.record(engine.bind(handle, &parents.to_vec(), transform));
}

fn unbind(engine: &mut BridgeEngine, handle: PropertyHandle, result: &mut BoundaryResult) {
    result.record(engine.unbind(handle));
}
