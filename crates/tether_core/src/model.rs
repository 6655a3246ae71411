//! Named binding models
//!
//! A [`Model`] exposes a component's bindings under names, nested as deep as
//! the component likes, and addressed by dotted paths:
//!
//! ```ignore
//! let mut frame = Model::new();
//! frame.insert("width", width.id());
//! frame.insert("height", height.id());
//!
//! let mut model = Model::new();
//! model.insert("opacity", opacity.id());
//! model.insert_model("frame", frame);
//!
//! model.set(&mut graph, "frame.width", Value::Int(120))?;
//! model.assign(&mut graph, "frame", &[("width", 10.into()), ("depth", 3.into())])?;
//! ```
//!
//! Writes go through the graph, so coercion and write guards apply exactly as
//! for direct `set_value` calls. Unknown paths are not errors.

use rustc_hash::FxHashMap;

use crate::binding::{BindingGraph, BindingId};
use crate::error::Result;
use crate::value::Value;

/// A model entry: a binding or a nested model
#[derive(Debug, Clone)]
pub enum ModelEntry {
    Binding(BindingId),
    Model(Model),
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    entries: FxHashMap<String, ModelEntry>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name a binding, replacing any entry with the same name
    pub fn insert(&mut self, name: impl Into<String>, id: BindingId) -> &mut Self {
        self.entries.insert(name.into(), ModelEntry::Binding(id));
        self
    }

    /// Nest a model, replacing any entry with the same name
    pub fn insert_model(&mut self, name: impl Into<String>, model: Model) -> &mut Self {
        self.entries.insert(name.into(), ModelEntry::Model(model));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by dotted path
    pub fn entry(&self, path: &str) -> Option<&ModelEntry> {
        let mut segments = path.split('.');
        let mut entry = self.entries.get(segments.next()?)?;
        for segment in segments {
            match entry {
                ModelEntry::Model(model) => entry = model.entries.get(segment)?,
                ModelEntry::Binding(_) => return None,
            }
        }
        Some(entry)
    }

    /// Binding id at a dotted path
    pub fn get(&self, path: &str) -> Option<BindingId> {
        match self.entry(path)? {
            ModelEntry::Binding(id) => Some(*id),
            ModelEntry::Model(_) => None,
        }
    }

    /// Nested model at a dotted path
    pub fn model(&self, path: &str) -> Option<&Model> {
        match self.entry(path)? {
            ModelEntry::Model(model) => Some(model),
            ModelEntry::Binding(_) => None,
        }
    }

    /// Current raw value of the binding at `path`
    pub fn get_value(&self, graph: &BindingGraph, path: &str) -> Result<Option<Value>> {
        match self.get(path) {
            Some(id) => graph.get_value(id, false).map(Some),
            None => Ok(None),
        }
    }

    /// Write the binding at `path`. Returns `false` for unknown paths.
    pub fn set(&self, graph: &mut BindingGraph, path: &str, value: Value) -> Result<bool> {
        match self.get(path) {
            Some(id) => graph.set_value(id, value).map(|()| true),
            None => Ok(false),
        }
    }

    /// Write the named bindings of the nested model at `path`.
    ///
    /// Names the nested model does not have are ignored; nested models
    /// inside it are not assignable this way. Returns how many bindings were
    /// written.
    pub fn assign(&self, graph: &mut BindingGraph, path: &str, fields: &[(&str, Value)]) -> Result<usize> {
        let Some(model) = self.model(path) else {
            return Ok(0);
        };
        let mut written = 0;
        for (name, value) in fields {
            match model.entries.get(*name) {
                Some(ModelEntry::Binding(id)) => {
                    graph.set_value(*id, value.clone())?;
                    written += 1;
                }
                _ => tracing::trace!(path, name, "assign skipped unknown field"),
            }
        }
        Ok(written)
    }
}
