//! Synchronous, ordered event delivery.

use tracing::trace;

use super::events::RunEvent;
use super::reporter::ReporterError;

/// Receives run lifecycle events.
pub trait EventSubscriber {
    /// Handle one event.
    fn on_event(&mut self, event: &RunEvent) -> Result<(), ReporterError>;
}

/// Delivers each event to every subscriber, in subscription order, before
/// returning. Callers must not dispatch from more than one thread.
#[derive(Default)]
pub struct EventDispatcher<'a> {
    subscribers: Vec<&'a mut dyn EventSubscriber>,
}

impl<'a> EventDispatcher<'a> {
    /// Dispatcher without subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Register a subscriber.
    pub fn subscribe(&mut self, subscriber: &'a mut dyn EventSubscriber) {
        self.subscribers.push(subscriber);
    }

    /// Deliver one event. Stops at the first subscriber error.
    pub fn dispatch(&mut self, event: &RunEvent) -> Result<(), ReporterError> {
        trace!(event = event.name(), "dispatching");
        for subscriber in self.subscribers.iter_mut() {
            subscriber.on_event(event)?;
        }
        Ok(())
    }

    /// Deliver events in order.
    pub fn dispatch_all<'e, I>(&mut self, events: I) -> Result<(), ReporterError>
    where
        I: IntoIterator<Item = &'e RunEvent>,
    {
        for event in events {
            self.dispatch(event)?;
        }
        Ok(())
    }
}
