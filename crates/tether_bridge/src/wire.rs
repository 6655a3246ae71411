//! Tagged wire values
//!
//! Every value that crosses the boundary travels as a [`WireValue`]: a one
//! byte tag followed by a kind-specific, little-endian payload.
//!
//! | tag | kind       | payload                                             |
//! |-----|------------|-----------------------------------------------------|
//! | 0   | boolean    | one byte, 0 or 1                                    |
//! | 1   | int        | i32                                                 |
//! | 2   | float      | f64                                                 |
//! | 3   | string     | UTF-8 bytes                                         |
//! | 4   | length     | sub-tagged expression tree (see [`encode_length`])  |
//! | 5   | brush      | four f64 channels, r g b a                          |
//! | 6   | layout     | one byte, 0 row / 1 column                          |
//! | 7   | collection | u32 count, then per item a u32 size and a frame     |
//!
//! The tag is kept raw: a foreign host can hand back any byte, and the
//! mismatch surfaces when the value is unwrapped.

use std::fmt;

use tether_core::{Brush, Collection, Color, Layout, Length, PropertyValue, Value, ValueKind};

use crate::error::{BridgeError, Result};

/// Known wire tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireTag {
    Boolean = 0,
    Int = 1,
    Float = 2,
    String = 3,
    Length = 4,
    Brush = 5,
    Layout = 6,
    Collection = 7,
}

impl WireTag {
    pub fn from_u8(raw: u8) -> Result<Self> {
        Ok(match raw {
            0 => WireTag::Boolean,
            1 => WireTag::Int,
            2 => WireTag::Float,
            3 => WireTag::String,
            4 => WireTag::Length,
            5 => WireTag::Brush,
            6 => WireTag::Layout,
            7 => WireTag::Collection,
            other => return Err(BridgeError::UnrecognizedTag(other)),
        })
    }

    pub fn of(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Boolean => WireTag::Boolean,
            ValueKind::Int => WireTag::Int,
            ValueKind::Float => WireTag::Float,
            ValueKind::String => WireTag::String,
            ValueKind::Length => WireTag::Length,
            ValueKind::Brush => WireTag::Brush,
            ValueKind::Layout => WireTag::Layout,
            ValueKind::Collection => WireTag::Collection,
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            WireTag::Boolean => ValueKind::Boolean,
            WireTag::Int => ValueKind::Int,
            WireTag::Float => ValueKind::Float,
            WireTag::String => ValueKind::String,
            WireTag::Length => ValueKind::Length,
            WireTag::Brush => ValueKind::Brush,
            WireTag::Layout => ValueKind::Layout,
            WireTag::Collection => ValueKind::Collection,
        }
    }
}

/// A value in wire form
#[derive(Clone, PartialEq, Eq)]
pub struct WireValue {
    tag: u8,
    payload: Vec<u8>,
}

impl WireValue {
    /// Wrap a typed value
    pub fn wrap<T: PropertyValue>(value: T) -> Self {
        Self::from_value(&value.into_value())
    }

    pub fn from_value(value: &Value) -> Self {
        let mut payload = Vec::new();
        encode_payload(value, &mut payload);
        Self {
            tag: WireTag::of(value.kind()) as u8,
            payload,
        }
    }

    /// Assemble from raw parts received from the far side; nothing is
    /// validated until the value is unwrapped
    pub fn from_raw_parts(tag: u8, payload: Vec<u8>) -> Self {
        Self { tag, payload }
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn wire_tag(&self) -> Result<WireTag> {
        WireTag::from_u8(self.tag)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Tag-checked unwrap into `T`
    pub fn unwrap<T: PropertyValue>(&self) -> Result<T> {
        let found = self.wire_tag()?.kind();
        if found != T::KIND {
            return Err(BridgeError::KindMismatch {
                expected: T::KIND,
                found,
            });
        }
        self.to_value().map(T::coerce)
    }

    /// Unwrap by dispatching on the tag
    pub fn to_value(&self) -> Result<Value> {
        decode_value(self.tag, &self.payload, 0)
    }

    /// Frame as `[tag][payload...]`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.payload.len() + 1);
        bytes.push(self.tag);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Parse and validate a `[tag][payload...]` frame
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (&tag, payload) = bytes
            .split_first()
            .ok_or(BridgeError::MalformedPayload("empty frame"))?;
        let value = Self::from_raw_parts(tag, payload.to_vec());
        value.to_value()?;
        Ok(value)
    }
}

impl fmt::Debug for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("WireValue");
        match WireTag::from_u8(self.tag) {
            Ok(tag) => s.field("tag", &tag),
            Err(_) => s.field("tag", &self.tag),
        };
        s.field("len", &self.payload.len()).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding
// ─────────────────────────────────────────────────────────────────────────────

fn encode_payload(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Boolean(v) => out.push(*v as u8),
        Value::Int(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Float(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::String(v) => out.extend_from_slice(v.as_bytes()),
        Value::Length(v) => encode_length(v, out),
        Value::Brush(v) => {
            for channel in v.color().to_array() {
                out.extend_from_slice(&channel.to_le_bytes());
            }
        }
        Value::Layout(v) => out.push(*v as u8),
        Value::Collection(items) => {
            out.extend_from_slice(&(items.len() as u32).to_le_bytes());
            for item in items {
                let frame = WireValue::from_value(item).to_bytes();
                out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
                out.extend_from_slice(&frame);
            }
        }
    }
}

const LENGTH_PX: u8 = 0;
const LENGTH_IN: u8 = 1;
const LENGTH_CM: u8 = 2;
const LENGTH_VW: u8 = 3;
const LENGTH_VH: u8 = 4;
const LENGTH_ADD: u8 = 5;
const LENGTH_SUB: u8 = 6;
const LENGTH_MUL: u8 = 7;
const LENGTH_DIV: u8 = 8;

/// Length trees are written prefix-first: a sub-tag, then either one f64
/// (units), two subtrees (add, sub) or a subtree and an f64 factor (mul, div).
pub fn encode_length(length: &Length, out: &mut Vec<u8>) {
    let unit = |out: &mut Vec<u8>, tag: u8, n: f64| {
        out.push(tag);
        out.extend_from_slice(&n.to_le_bytes());
    };
    match length {
        Length::Px(n) => unit(out, LENGTH_PX, *n),
        Length::In(n) => unit(out, LENGTH_IN, *n),
        Length::Cm(n) => unit(out, LENGTH_CM, *n),
        Length::Vw(n) => unit(out, LENGTH_VW, *n),
        Length::Vh(n) => unit(out, LENGTH_VH, *n),
        Length::Add(l, r) | Length::Sub(l, r) => {
            out.push(if matches!(length, Length::Add(..)) {
                LENGTH_ADD
            } else {
                LENGTH_SUB
            });
            encode_length(l, out);
            encode_length(r, out);
        }
        Length::Mul(l, n) | Length::Div(l, n) => {
            out.push(if matches!(length, Length::Mul(..)) {
                LENGTH_MUL
            } else {
                LENGTH_DIV
            });
            encode_length(l, out);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────────────────────────

/// Deepest collection nesting or length tree a payload may carry
pub const MAX_NESTING: usize = 64;

/// Cursor over a payload
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Collections enclosing this payload
    depth: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], depth: usize) -> Self {
        Self {
            bytes,
            pos: 0,
            depth,
        }
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(BridgeError::MalformedPayload(what))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }

    fn u8(&mut self, what: &'static str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u32(&mut self, what: &'static str) -> Result<u32> {
        let bytes = self.take(4, what)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N, what)?);
        Ok(array)
    }

    fn f64(&mut self, what: &'static str) -> Result<f64> {
        self.array::<8>(what).map(f64::from_le_bytes)
    }

    fn finish(&self, tag: WireTag) -> Result<()> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(BridgeError::MalformedPayload(tag.kind().name()))
        }
    }
}

fn decode_value(tag: u8, payload: &[u8], depth: usize) -> Result<Value> {
    let tag = WireTag::from_u8(tag)?;
    let mut reader = Reader::new(payload, depth);
    let value = decode_payload(tag, &mut reader)?;
    reader.finish(tag)?;
    Ok(value)
}

fn decode_payload(tag: WireTag, reader: &mut Reader<'_>) -> Result<Value> {
    let what = tag.kind().name();
    Ok(match tag {
        WireTag::Boolean => match reader.u8(what)? {
            0 => Value::Boolean(false),
            1 => Value::Boolean(true),
            _ => return Err(BridgeError::MalformedPayload(what)),
        },
        WireTag::Int => Value::Int(i32::from_le_bytes(reader.array::<4>(what)?)),
        WireTag::Float => Value::Float(reader.f64(what)?),
        WireTag::String => {
            let text = std::str::from_utf8(reader.rest())
                .map_err(|_| BridgeError::MalformedPayload(what))?;
            Value::String(text.into())
        }
        WireTag::Length => Value::Length(decode_length(reader, 0)?),
        WireTag::Brush => {
            let r = reader.f64(what)?;
            let g = reader.f64(what)?;
            let b = reader.f64(what)?;
            let a = reader.f64(what)?;
            Value::Brush(Brush::Solid(Color::rgba(r, g, b, a)))
        }
        WireTag::Layout => {
            Value::Layout(Layout::from_u8(reader.u8(what)?).ok_or(BridgeError::MalformedPayload(what))?)
        }
        WireTag::Collection => {
            let count = reader.u32(what)?;
            if count > 0 && reader.depth >= MAX_NESTING {
                return Err(BridgeError::MalformedPayload(what));
            }
            let mut items = Vec::new();
            for _ in 0..count {
                let size = reader.u32(what)? as usize;
                let (&tag, payload) = reader
                    .take(size, what)?
                    .split_first()
                    .ok_or(BridgeError::MalformedPayload("empty frame"))?;
                items.push(decode_value(tag, payload, reader.depth + 1)?);
            }
            Value::Collection(Collection::from(items))
        }
    })
}

fn decode_length(reader: &mut Reader<'_>, depth: usize) -> Result<Length> {
    const WHAT: &str = "length";
    if depth > MAX_NESTING {
        return Err(BridgeError::MalformedPayload(WHAT));
    }
    let next = depth + 1;
    Ok(match reader.u8(WHAT)? {
        LENGTH_PX => Length::Px(reader.f64(WHAT)?),
        LENGTH_IN => Length::In(reader.f64(WHAT)?),
        LENGTH_CM => Length::Cm(reader.f64(WHAT)?),
        LENGTH_VW => Length::Vw(reader.f64(WHAT)?),
        LENGTH_VH => Length::Vh(reader.f64(WHAT)?),
        LENGTH_ADD => Length::Add(
            Box::new(decode_length(reader, next)?),
            Box::new(decode_length(reader, next)?),
        ),
        LENGTH_SUB => Length::Sub(
            Box::new(decode_length(reader, next)?),
            Box::new(decode_length(reader, next)?),
        ),
        LENGTH_MUL => Length::Mul(Box::new(decode_length(reader, next)?), reader.f64(WHAT)?),
        LENGTH_DIV => Length::Div(Box::new(decode_length(reader, next)?), reader.f64(WHAT)?),
        _ => return Err(BridgeError::MalformedPayload(WHAT)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_layout() {
        assert_eq!(WireValue::wrap(true).payload(), &[1]);
        assert_eq!(WireValue::wrap(-2i32).payload(), &(-2i32).to_le_bytes());
        assert_eq!(WireValue::wrap(String::from("hi")).to_bytes(), vec![3, b'h', b'i']);
        assert_eq!(WireValue::wrap(Layout::Column).to_bytes(), vec![6, 1]);
    }

    #[test]
    fn test_symbolic_length_survives() {
        let length = (Length::Px(10.0) + Length::Vw(5.0)) * 0.5;
        let wire = WireValue::wrap(length.clone());
        assert_eq!(wire.tag(), WireTag::Length as u8);
        assert_eq!(wire.unwrap::<Length>().unwrap(), length);
    }

    #[test]
    fn test_nested_collection() {
        let inner: Collection = vec![Value::from("a"), Value::Int(2)].into();
        let outer: Collection = vec![Value::Collection(inner), Value::Boolean(true)].into();
        let wire = WireValue::wrap(outer.clone());
        assert_eq!(wire.unwrap::<Collection>().unwrap(), outer);
    }

    #[test]
    fn test_unknown_tag() {
        let wire = WireValue::from_raw_parts(42, vec![]);
        assert_eq!(wire.to_value(), Err(BridgeError::UnrecognizedTag(42)));
        assert_eq!(wire.unwrap::<bool>(), Err(BridgeError::UnrecognizedTag(42)));
        assert_eq!(
            WireValue::from_bytes(&[200, 1, 2]),
            Err(BridgeError::UnrecognizedTag(200))
        );
    }

    #[test]
    fn test_kind_mismatch() {
        let wire = WireValue::wrap(1.5f64);
        assert_eq!(
            wire.unwrap::<i32>(),
            Err(BridgeError::KindMismatch {
                expected: ValueKind::Int,
                found: ValueKind::Float
            })
        );
    }

    #[test]
    fn test_malformed_payloads() {
        let cases = [
            WireValue::from_raw_parts(0, vec![2]),
            WireValue::from_raw_parts(1, vec![1, 2]),
            WireValue::from_raw_parts(2, vec![0; 9]),
            WireValue::from_raw_parts(3, vec![0xff, 0xfe]),
            WireValue::from_raw_parts(4, vec![LENGTH_ADD, LENGTH_PX]),
            WireValue::from_raw_parts(6, vec![3]),
            WireValue::from_raw_parts(7, vec![1, 0, 0, 0]),
        ];
        for wire in cases {
            assert!(
                matches!(wire.to_value(), Err(BridgeError::MalformedPayload(_))),
                "{wire:?} decoded"
            );
        }
        assert_eq!(
            WireValue::from_bytes(&[]),
            Err(BridgeError::MalformedPayload("empty frame"))
        );
    }

    #[test]
    fn test_deep_length_tree_is_rejected() {
        let mut payload = vec![LENGTH_ADD; 100_000];
        payload.push(LENGTH_PX);
        let wire = WireValue::from_raw_parts(WireTag::Length as u8, payload);
        assert_eq!(wire.to_value(), Err(BridgeError::MalformedPayload("length")));
    }

    #[test]
    fn test_length_tree_at_nesting_limit_decodes() {
        let mut length = Length::Vw(1.0);
        for _ in 0..MAX_NESTING {
            length = Length::Add(Box::new(length), Box::new(Length::Px(1.0)));
        }
        let wire = WireValue::wrap(length.clone());
        assert_eq!(wire.unwrap::<Length>().unwrap(), length);

        let deeper = WireValue::wrap(Length::Add(Box::new(length), Box::new(Length::Px(1.0))));
        assert!(deeper.to_value().is_err());
    }

    #[test]
    fn test_deep_collection_nesting_is_rejected() {
        let mut value = Value::Int(1);
        for _ in 0..=MAX_NESTING {
            value = Value::Collection(vec![value].into());
        }
        let wire = WireValue::from_value(&value);
        assert_eq!(wire.to_value(), Err(BridgeError::MalformedPayload("collection")));

        let mut shallow = Value::Int(1);
        for _ in 0..MAX_NESTING {
            shallow = Value::Collection(vec![shallow].into());
        }
        assert_eq!(WireValue::from_value(&shallow).to_value().unwrap(), shallow);
    }
}
