//! Render-side collaborator contracts
//!
//! Components hold an [`EventEmitter`] and a [`Children`] list as fields.
//! Both keep their own state and mirror every change into an optional
//! adapter supplied by whatever backend renders the component.

use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Handler for a named event on element `E`
pub type EventHandler<E> = Rc<dyn Fn(&E, &Value)>;

/// Backend hook for native event delivery
pub trait EventAdapter<E> {
    fn add_listener(&mut self, handler: EventHandler<E>, name: &str);
    fn remove_listener(&mut self, name: &str);
}

/// Named event handlers of one element
pub struct EventEmitter<E> {
    handlers: FxHashMap<String, EventHandler<E>>,
    adapter: Option<Box<dyn EventAdapter<E>>>,
}

impl<E> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
            adapter: None,
        }
    }

    /// Attach a backend; handlers registered so far are replayed into it
    pub fn set_adapter(&mut self, mut adapter: Box<dyn EventAdapter<E>>) {
        for (name, handler) in &self.handlers {
            adapter.add_listener(handler.clone(), name);
        }
        self.adapter = Some(adapter);
    }

    /// Register `handler` under `name`, replacing any previous handler
    pub fn add_listener<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&E, &Value) + 'static,
    {
        let name = name.into();
        let handler: EventHandler<E> = Rc::new(handler);
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.add_listener(handler.clone(), &name);
        }
        self.handlers.insert(name, handler);
    }

    pub fn remove_listener(&mut self, name: &str) {
        self.handlers.remove(name);
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.remove_listener(name);
        }
    }

    pub fn has_listener(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run the handler registered under `name`. Returns whether one ran.
    pub fn dispatch(&self, name: &str, element: &E, event: &Value) -> bool {
        match self.handlers.get(name) {
            Some(handler) => {
                handler(element, event);
                true
            }
            None => false,
        }
    }
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("adapter", &self.adapter.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Children
// ─────────────────────────────────────────────────────────────────────────────

/// Backend hook for rendering child lists
pub trait ChildrenAdapter<C> {
    fn append(&mut self, elements: &[C]);
    fn replace(&mut self, old: &[C], new: &[C]);
}

/// Ordered child list of one container
pub struct Children<C> {
    items: Vec<C>,
    adapter: Option<Box<dyn ChildrenAdapter<C>>>,
}

impl<C> Children<C> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            adapter: None,
        }
    }

    pub fn set_adapter(&mut self, adapter: Box<dyn ChildrenAdapter<C>>) {
        self.adapter = Some(adapter);
    }

    pub fn append(&mut self, elements: Vec<C>) {
        let start = self.items.len();
        self.items.extend(elements);
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.append(&self.items[start..]);
        }
    }

    /// Replace the whole list
    pub fn replace(&mut self, elements: Vec<C>) {
        let old = std::mem::replace(&mut self.items, elements);
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.replace(&old, &self.items);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.items.iter()
    }
}

impl<C> Default for Children<C> {
    fn default() -> Self {
        Self::new()
    }
}
