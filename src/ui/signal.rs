//! Outgoing events of UI components.

/// Event source with any number of connected slots.
///
/// Slots run synchronously, in connection order, on the emitting thread.
pub struct Signal<T> {
    slots: Vec<Box<dyn Fn(&T) + Send>>,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn connect(&mut self, slot: impl Fn(&T) + Send + 'static) {
        self.slots.push(Box::new(slot));
    }

    pub fn emit(&self, value: &T) {
        for slot in &self.slots {
            slot(value);
        }
    }

    pub fn disconnect_all(&mut self) {
        self.slots.clear();
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signal({} slots)", self.slots.len())
    }
}
