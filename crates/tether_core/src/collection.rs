//! Immutable value collections
//!
//! Repeated content (lists of items to render, ranges) is carried through
//! the graph as a [`Collection`]. Clones share storage.

use std::rc::Rc;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Collection(Rc<[Value]>);

impl Collection {
    pub fn empty() -> Self {
        Collection(Rc::from(Vec::new()))
    }

    /// `1..=n` as `Int` values; non-positive `n` is empty
    pub fn from_int_range(n: i32) -> Self {
        (1..=n.max(0)).map(Value::Int).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Collection(iter.into_iter().collect())
    }
}

impl From<Vec<Value>> for Collection {
    fn from(values: Vec<Value>) -> Self {
        Collection(values.into())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
