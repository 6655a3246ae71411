//! Integer handles for callbacks crossing the boundary
//!
//! Callbacks never cross the boundary themselves. The side that owns a
//! callback stores it in a [`HandleTable`] and passes its integer handle
//! instead; the far side invokes it through the host and releases it when
//! it is no longer reachable. Released slots go on a free-list and are
//! handed out again before the table grows, so steady register/release
//! churn keeps the table at a constant size.

/// Callback handle
pub type Handle = u32;

/// Permanent null handle ("no callback")
pub const NULL_HANDLE: Handle = 0;

#[derive(Debug)]
pub struct HandleTable<F> {
    slots: Vec<Option<F>>,
    free: Vec<Handle>,
    reserved: Handle,
}

impl<F> HandleTable<F> {
    /// Table with only the null handle reserved
    pub fn new() -> Self {
        Self::with_reserved(1)
    }

    /// Table whose first `reserved` handles are never handed out.
    ///
    /// At least the null handle is always reserved.
    pub fn with_reserved(reserved: Handle) -> Self {
        let reserved = reserved.max(1);
        Self {
            slots: (0..reserved).map(|_| None).collect(),
            free: Vec::new(),
            reserved,
        }
    }

    pub fn register(&mut self, function: F) -> Handle {
        match self.free.pop() {
            Some(handle) => {
                self.slots[handle as usize] = Some(function);
                handle
            }
            None => {
                self.slots.push(Some(function));
                (self.slots.len() - 1) as Handle
            }
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&F> {
        self.slots.get(handle as usize).and_then(Option::as_ref)
    }

    /// Release a handle for reuse. Reserved and vacant handles return `None`.
    pub fn release(&mut self, handle: Handle) -> Option<F> {
        if handle < self.reserved {
            return None;
        }
        let function = self.slots.get_mut(handle as usize)?.take()?;
        self.free.push(handle);
        Some(function)
    }

    /// Live entries
    pub fn len(&self) -> usize {
        self.slots.len() - self.reserved as usize - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots ever allocated, excluding reserved ones
    pub fn high_water_mark(&self) -> usize {
        self.slots.len() - self.reserved as usize
    }
}

impl<F> Default for HandleTable<F> {
    fn default() -> Self {
        Self::new()
    }
}
