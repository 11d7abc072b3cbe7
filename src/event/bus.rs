use std::collections::VecDeque;
use std::fmt;

use log::{debug, trace};

use crate::event::{CanvasEvent, EventHandler, EventKind};

/// Returned by [`EventBus::subscribe`]; pass it to [`EventBus::unsubscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every kind
    kinds: Option<Vec<EventKind>>,
    handler: Box<dyn EventHandler>,
}

impl Subscription {
    fn wants(&self, kind: EventKind) -> bool {
        self.kinds.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Pending canvas notifications and the handlers they go to.
///
/// Scene mutations [`post`](EventBus::post) events; nothing reaches a
/// handler until [`flush`](EventBus::flush), which delivers the queue in
/// posting order. A handler therefore only sees a scene whose change has
/// been fully applied.
#[derive(Default)]
pub struct EventBus {
    pending: VecDeque<CanvasEvent>,
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe(&mut self, handler: impl EventHandler + 'static) -> SubscriptionId {
        self.add_subscription(None, Box::new(handler))
    }

    /// Receive only events of the given kinds
    pub fn subscribe_to(&mut self, kinds: &[EventKind], handler: impl EventHandler + 'static) -> SubscriptionId {
        self.add_subscription(Some(kinds.to_vec()), Box::new(handler))
    }

    fn add_subscription(&mut self, kinds: Option<Vec<EventKind>>, handler: Box<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kinds, handler });
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        before != self.subscriptions.len()
    }

    pub fn handler_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Queue an event for the next flush
    pub fn post(&mut self, event: CanvasEvent) {
        trace!("Queued {:?}", event);
        self.pending.push_back(event);
    }

    pub fn pending(&self) -> impl Iterator<Item = &CanvasEvent> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Remove the queued events without delivering them
    pub fn take_pending(&mut self) -> Vec<CanvasEvent> {
        self.pending.drain(..).collect()
    }

    /// Deliver every queued event, oldest first. Returns how many were
    /// delivered.
    pub fn flush(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.pending.pop_front() {
            debug!("Delivering {:?}", event);
            self.dispatch(&event);
            delivered += 1;
        }
        delivered
    }

    /// Deliver `event` right away, ahead of anything queued
    pub fn emit(&mut self, event: &CanvasEvent) {
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: &CanvasEvent) {
        let kind = event.kind();
        for subscription in &mut self.subscriptions {
            if subscription.wants(kind) {
                subscription.handler.handle_event(event);
            }
        }
    }
}
