//! Value kinds carried by bindings
//!
//! Every binding holds a value of exactly one [`ValueKind`]. The dynamic
//! [`Value`] enum is the uniform currency the graph moves around: transforms
//! receive ancestor values as `&[Value]`, listeners receive previous/current
//! values, and coercion accepts any `Value` as input.
//!
//! Each kind implements [`PropertyValue`], the contract the graph is generic
//! over:
//!
//! - `default_value()` - the value a fresh binding starts with
//! - `coerce(Value)` - conversion of arbitrary input into the kind
//! - `equals(&a, &b)` - value equality
//! - `interpolate(&prev, &next, factor)` - the blend used by transitions
//!
//! Discrete kinds (booleans, strings, layouts, collections) snap from the
//! previous to the next value at `factor == 0.5`.

use std::fmt;
use std::rc::Rc;

use crate::brush::Brush;
use crate::collection::Collection;
use crate::length::Length;

// ─────────────────────────────────────────────────────────────────────────────
// Value / ValueKind
// ─────────────────────────────────────────────────────────────────────────────

/// A value of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int(i32),
    Float(f64),
    String(Rc<str>),
    Length(Length),
    Brush(Brush),
    Layout(Layout),
    Collection(Collection),
}

/// The closed set of value kinds a binding can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Int,
    Float,
    String,
    Length,
    Brush,
    Layout,
    Collection,
}

/// Runs `$body` with `$t` aliased to the Rust type implementing `$kind`.
macro_rules! with_kind {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            ValueKind::Boolean => {
                type $t = bool;
                $body
            }
            ValueKind::Int => {
                type $t = i32;
                $body
            }
            ValueKind::Float => {
                type $t = f64;
                $body
            }
            ValueKind::String => {
                type $t = String;
                $body
            }
            ValueKind::Length => {
                type $t = Length;
                $body
            }
            ValueKind::Brush => {
                type $t = Brush;
                $body
            }
            ValueKind::Layout => {
                type $t = Layout;
                $body
            }
            ValueKind::Collection => {
                type $t = Collection;
                $body
            }
        }
    };
}

impl ValueKind {
    /// Every kind, in wire-tag order
    pub const ALL: [ValueKind; 8] = [
        ValueKind::Boolean,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::String,
        ValueKind::Length,
        ValueKind::Brush,
        ValueKind::Layout,
        ValueKind::Collection,
    ];

    /// Human readable name, used in logs and error messages
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Length => "length",
            ValueKind::Brush => "brush",
            ValueKind::Layout => "layout",
            ValueKind::Collection => "collection",
        }
    }

    /// The kind's default value
    pub fn default_value(self) -> Value {
        with_kind!(self, T => T::default_value().into_value())
    }

    /// Coerce an arbitrary value into this kind
    pub fn coerce(self, value: Value) -> Value {
        if value.kind() == self {
            return value;
        }
        with_kind!(self, T => T::coerce(value).into_value())
    }

    /// Blend two values of this kind
    pub fn interpolate(self, prev: &Value, next: &Value, factor: f64) -> Value {
        with_kind!(self, T => {
            let prev = T::coerce(prev.clone());
            let next = T::coerce(next.clone());
            prev.interpolate(&next, factor).into_value()
        })
    }

    /// Compare two values under this kind's equality
    pub fn equals(self, a: &Value, b: &Value) -> bool {
        with_kind!(self, T => T::coerce(a.clone()).equals(&T::coerce(b.clone())))
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// The kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Length(_) => ValueKind::Length,
            Value::Brush(_) => ValueKind::Brush,
            Value::Layout(_) => ValueKind::Layout,
            Value::Collection(_) => ValueKind::Collection,
        }
    }

    /// Blend from `self` toward `next`
    ///
    /// Values of different kinds have no shared interpolation path and snap
    /// at the midpoint.
    pub fn interpolate(&self, next: &Value, factor: f64) -> Value {
        if self.kind() == next.kind() {
            self.kind().interpolate(self, next, factor)
        } else {
            snap(self, next, factor)
        }
    }

    /// Convert into a concrete kind (coercing when the kinds differ)
    pub fn to<T: PropertyValue>(&self) -> T {
        T::coerce(self.clone())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Length(v) => write!(f, "{v}"),
            Value::Brush(v) => write!(f, "{v}"),
            Value::Layout(v) => write!(f, "{v}"),
            Value::Collection(v) => write!(f, "{v:?}"),
        }
    }
}

/// Discrete blend: the previous value until the midpoint, then the next one
pub fn snap<T: Clone>(prev: &T, next: &T, factor: f64) -> T {
    if factor < 0.5 {
        prev.clone()
    } else {
        next.clone()
    }
}

fn lerp(prev: f64, next: f64, factor: f64) -> f64 {
    (next - prev) * factor + prev
}

// ─────────────────────────────────────────────────────────────────────────────
// PropertyValue contract
// ─────────────────────────────────────────────────────────────────────────────

/// A Rust type that can live in a binding
pub trait PropertyValue: Clone + PartialEq + fmt::Debug + 'static {
    /// The kind this type represents
    const KIND: ValueKind;

    /// Value held by a freshly created binding
    fn default_value() -> Self;

    /// Convert arbitrary input into this kind's canonical representation
    fn coerce(value: Value) -> Self;

    /// Wrap into the dynamic representation
    fn into_value(self) -> Value;

    /// Value equality
    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    /// Blend from `self` toward `next`; `factor` is in `[0, 1]`
    fn interpolate(&self, next: &Self, factor: f64) -> Self {
        snap(self, next, factor)
    }
}

impl PropertyValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn default_value() -> Self {
        false
    }

    fn coerce(value: Value) -> Self {
        match value {
            Value::Boolean(v) => v,
            Value::Int(v) => v != 0,
            Value::Float(v) => v != 0.0 && !v.is_nan(),
            Value::String(v) => !v.is_empty(),
            Value::Collection(v) => !v.is_empty(),
            Value::Length(_) | Value::Brush(_) | Value::Layout(_) => true,
        }
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}

impl PropertyValue for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn default_value() -> Self {
        0
    }

    fn coerce(value: Value) -> Self {
        match value {
            Value::Int(v) => v,
            // `as` truncates toward zero and saturates; NaN becomes 0
            other => f64::coerce(other) as i32,
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn interpolate(&self, next: &Self, factor: f64) -> Self {
        lerp(*self as f64, *next as f64, factor) as i32
    }
}

impl PropertyValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn default_value() -> Self {
        0.0
    }

    fn coerce(value: Value) -> Self {
        match value {
            Value::Float(v) => v,
            Value::Int(v) => v as f64,
            Value::Boolean(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
            Value::String(v) => v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| !n.is_nan())
                .unwrap_or(0.0),
            Value::Length(Length::Px(v)) => v,
            Value::Length(_) | Value::Brush(_) | Value::Layout(_) | Value::Collection(_) => 0.0,
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn interpolate(&self, next: &Self, factor: f64) -> Self {
        lerp(*self, *next, factor)
    }
}

impl PropertyValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn default_value() -> Self {
        String::new()
    }

    fn coerce(value: Value) -> Self {
        match value {
            Value::String(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Boolean(v) => v.to_string(),
            Value::Length(_) | Value::Brush(_) | Value::Layout(_) | Value::Collection(_) => {
                String::new()
            }
        }
    }

    fn into_value(self) -> Value {
        Value::String(self.into())
    }
}

impl PropertyValue for Length {
    const KIND: ValueKind = ValueKind::Length;

    fn default_value() -> Self {
        Length::Px(0.0)
    }

    fn coerce(value: Value) -> Self {
        match value {
            Value::Length(v) => v,
            Value::Int(v) => Length::Px(v as f64),
            Value::Float(v) if !v.is_nan() => Length::Px(v),
            _ => Length::default_value(),
        }
    }

    fn into_value(self) -> Value {
        Value::Length(self)
    }

    fn interpolate(&self, next: &Self, factor: f64) -> Self {
        match (self, next) {
            (Length::Px(a), Length::Px(b)) => Length::Px(lerp(*a, *b, factor)),
            _ => (next.clone() - self.clone()) * factor + self.clone(),
        }
    }
}

impl PropertyValue for Brush {
    const KIND: ValueKind = ValueKind::Brush;

    fn default_value() -> Self {
        Brush::TRANSPARENT
    }

    fn coerce(value: Value) -> Self {
        match value {
            Value::Brush(v) => v,
            _ => Brush::TRANSPARENT,
        }
    }

    fn into_value(self) -> Value {
        Value::Brush(self)
    }

    fn interpolate(&self, next: &Self, factor: f64) -> Self {
        Brush::lerp(self, next, factor)
    }
}

impl PropertyValue for Collection {
    const KIND: ValueKind = ValueKind::Collection;

    fn default_value() -> Self {
        Collection::empty()
    }

    fn coerce(value: Value) -> Self {
        match value {
            Value::Collection(v) => v,
            Value::Int(n) => Collection::from_int_range(n),
            _ => Collection::empty(),
        }
    }

    fn into_value(self) -> Value {
        Value::Collection(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Main axis of a layout container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Layout {
    #[default]
    Row = 0,
    Column = 1,
}

impl Layout {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Layout::Row),
            1 => Some(Layout::Column),
            _ => None,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Row => f.write_str("row"),
            Layout::Column => f.write_str("column"),
        }
    }
}

impl PropertyValue for Layout {
    const KIND: ValueKind = ValueKind::Layout;

    fn default_value() -> Self {
        Layout::Row
    }

    fn coerce(value: Value) -> Self {
        match value {
            Value::Layout(v) => v,
            Value::Int(1) => Layout::Column,
            Value::String(s) if s.eq_ignore_ascii_case("column") => Layout::Column,
            _ => Layout::Row,
        }
    }

    fn into_value(self) -> Value {
        Value::Layout(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}

impl From<Length> for Value {
    fn from(value: Length) -> Self {
        Value::Length(value)
    }
}

impl From<Brush> for Value {
    fn from(value: Brush) -> Self {
        Value::Brush(value)
    }
}

impl From<Layout> for Value {
    fn from(value: Layout) -> Self {
        Value::Layout(value)
    }
}

impl From<Collection> for Value {
    fn from(value: Collection) -> Self {
        Value::Collection(value)
    }
}
