//! Growable sequences crossing the boundary
//!
//! A sequence is a flat byte buffer plus element offsets. What an element
//! looks like is decided by a [`SeqOps`] table of plain function pointers,
//! one table per element kind, and [`BoundarySeq`] is the single adapter
//! driven by any such table.

use std::fmt;
use std::mem;

use tether_core::BindingId;

use crate::wire::WireValue;

/// Backing storage of a boundary sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSeq {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl RawSeq {
    fn element(&self, index: usize) -> Option<&[u8]> {
        let start = *self.offsets.get(index)?;
        let end = self
            .offsets
            .get(index + 1)
            .copied()
            .unwrap_or(self.bytes.len());
        self.bytes.get(start..end)
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.offsets.push(self.bytes.len());
        self.bytes.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Per-element-kind sequence operations
pub struct SeqOps<E> {
    pub new: fn() -> RawSeq,
    pub get: fn(&RawSeq, usize) -> Option<E>,
    pub len: fn(&RawSeq) -> usize,
    pub push: fn(&mut RawSeq, &E),
    pub drop: fn(RawSeq),
}

fn raw_new() -> RawSeq {
    RawSeq::default()
}

fn raw_len(raw: &RawSeq) -> usize {
    raw.offsets.len()
}

fn raw_drop(raw: RawSeq) {
    tracing::trace!(elements = raw.offsets.len(), "released boundary sequence");
}

// ─────────────────────────────────────────────────────────────────────────────
// Element kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Reference to an engine node, usable as a bind parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeakRef(pub u64);

impl WeakRef {
    pub fn from_binding(id: BindingId) -> Self {
        Self(id.to_raw())
    }

    pub fn binding(self) -> BindingId {
        BindingId::from_raw(self.0)
    }
}

fn weakref_get(raw: &RawSeq, index: usize) -> Option<WeakRef> {
    let bytes: [u8; 8] = raw.element(index)?.try_into().ok()?;
    Some(WeakRef(u64::from_le_bytes(bytes)))
}

fn weakref_push(raw: &mut RawSeq, item: &WeakRef) {
    raw.push_bytes(&item.0.to_le_bytes());
}

fn value_get(raw: &RawSeq, index: usize) -> Option<WireValue> {
    WireValue::from_bytes(raw.element(index)?).ok()
}

fn value_push(raw: &mut RawSeq, item: &WireValue) {
    raw.push_bytes(&item.to_bytes());
}

/// Sequence of node references
pub static WEAKREF_SEQ: SeqOps<WeakRef> = SeqOps {
    new: raw_new,
    get: weakref_get,
    len: raw_len,
    push: weakref_push,
    drop: raw_drop,
};

/// Sequence of framed wire values
pub static VALUE_SEQ: SeqOps<WireValue> = SeqOps {
    new: raw_new,
    get: value_get,
    len: raw_len,
    push: value_push,
    drop: raw_drop,
};

// ─────────────────────────────────────────────────────────────────────────────
// Adapter
// ─────────────────────────────────────────────────────────────────────────────

pub struct BoundarySeq<E: 'static> {
    raw: RawSeq,
    ops: &'static SeqOps<E>,
}

impl<E: 'static> BoundarySeq<E> {
    pub fn with_ops(ops: &'static SeqOps<E>) -> Self {
        Self {
            raw: (ops.new)(),
            ops,
        }
    }

    pub fn from_slice(ops: &'static SeqOps<E>, items: &[E]) -> Self {
        let mut seq = Self::with_ops(ops);
        for item in items {
            seq.push(item);
        }
        seq
    }

    /// Adopt storage produced by the same element kind
    pub fn from_raw(ops: &'static SeqOps<E>, raw: RawSeq) -> Self {
        Self { raw, ops }
    }

    pub fn push(&mut self, item: &E) {
        (self.ops.push)(&mut self.raw, item);
    }

    pub fn get(&self, index: usize) -> Option<E> {
        (self.ops.get)(&self.raw, index)
    }

    pub fn len(&self) -> usize {
        (self.ops.len)(&self.raw)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in order; undecodable ones are skipped
    pub fn to_vec(&self) -> Vec<E> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    pub fn raw(&self) -> &RawSeq {
        &self.raw
    }

    /// Give up the storage without releasing it
    pub fn into_raw(mut self) -> RawSeq {
        mem::take(&mut self.raw)
    }
}

impl<E: 'static> Drop for BoundarySeq<E> {
    fn drop(&mut self) {
        (self.ops.drop)(mem::take(&mut self.raw));
    }
}

impl<E: fmt::Debug + 'static> fmt::Debug for BoundarySeq<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}
