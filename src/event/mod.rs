mod bus;
mod events;
mod handlers;

pub use bus::{EventBus, SubscriptionId};
pub use events::{CanvasEvent, EventKind};
pub use handlers::EventRecorder;

pub trait EventHandler {
    fn handle_event(&mut self, event: &CanvasEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&CanvasEvent),
{
    fn handle_event(&mut self, event: &CanvasEvent) {
        self(event)
    }
}
