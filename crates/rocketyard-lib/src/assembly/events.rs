//! Change notifications emitted by the assembler.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

use super::assembler::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    /// Parts or connections changed.
    Structure,
    /// Only positions or rotations changed.
    Visual,
}

/// One committed change to a rocket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AssemblyEvent {
    PartAdded {
        instance_id: String,
        part_id: String,
    },
    PartRemoved {
        instance_id: String,
    },
    PartMoved {
        instance_id: String,
        position: [f64; 3],
    },
    PartRotated {
        instance_id: String,
        rotation: [f64; 3],
    },
    ConnectionCreated {
        connection: Connection,
    },
    ConnectionRemoved {
        connection: Connection,
    },
    RocketCleared,
    RocketUpdated {
        kind: UpdateKind,
    },
}

impl AssemblyEvent {
    /// Topic name, e.g. `connection:created`.
    pub fn name(&self) -> &'static str {
        match self {
            AssemblyEvent::PartAdded { .. } => "part:added",
            AssemblyEvent::PartRemoved { .. } => "part:removed",
            AssemblyEvent::PartMoved { .. } => "part:moved",
            AssemblyEvent::PartRotated { .. } => "part:rotated",
            AssemblyEvent::ConnectionCreated { .. } => "connection:created",
            AssemblyEvent::ConnectionRemoved { .. } => "connection:removed",
            AssemblyEvent::RocketCleared => "rocket:cleared",
            AssemblyEvent::RocketUpdated { .. } => "rocket:updated",
        }
    }
}

impl fmt::Display for AssemblyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyEvent::RocketUpdated { kind } => write!(f, "rocket:updated({kind:?})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&AssemblyEvent) + Send>;

/// Synchronous fan-out to subscribers in registration order.
#[derive(Default)]
pub(crate) struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub(crate) fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&AssemblyEvent) + Send + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every subscriber. A panicking subscriber is logged
    /// and skipped; later subscribers still run.
    pub(crate) fn emit(&mut self, event: &AssemblyEvent) {
        for (id, subscriber) in &mut self.subscribers {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| subscriber(event)));
            if delivered.is_err() {
                warn!(subscription = id.0, event = event.name(), "event subscriber panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn panicking_subscriber_does_not_block_others() {
        let mut bus = EventBus::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(|_| panic!("subscriber bug"));
        let sink = Arc::clone(&seen);
        bus.subscribe(move |event| {
            sink.lock().expect("lock").push(event.name());
        });

        bus.emit(&AssemblyEvent::RocketCleared);
        assert_eq!(*seen.lock().expect("lock"), vec!["rocket:cleared"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::default();
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let id = bus.subscribe(move |_| *sink.lock().expect("lock") += 1);

        bus.emit(&AssemblyEvent::RocketCleared);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&AssemblyEvent::RocketCleared);
        assert_eq!(*count.lock().expect("lock"), 1);
    }
}
