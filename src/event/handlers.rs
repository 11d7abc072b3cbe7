use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{CanvasEvent, EventHandler};

/// Handler that keeps every event it receives.
///
/// Clones share the same log, so one clone can be subscribed to a bus while
/// another is kept to read what arrived.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<CanvasEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<CanvasEvent> {
        self.events.borrow().clone()
    }

    /// Remove and return the events received so far
    pub fn take(&self) -> Vec<CanvasEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn count(&self, predicate: impl Fn(&CanvasEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }
}

impl EventHandler for EventRecorder {
    fn handle_event(&mut self, event: &CanvasEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
