//! # Notification Bus
//!
//! Synchronous, ordered fan-out of [`CubeEvent`]s to subscribed observers.
//!
//! Delivery happens in subscription order and stops at the first observer
//! that fails. The failure is returned to the caller of the mutation, which
//! has already been applied.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use super::event::{CubeEvent, EventKind};

/// Error returned by an observer that rejects an event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ObserverError {
    message: String,
}

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Receiver of datacube change notifications
pub trait CubeObserver {
    fn on_event(&mut self, event: &CubeEvent) -> Result<(), ObserverError>;
}

impl<F> CubeObserver for F
where
    F: FnMut(&CubeEvent) -> Result<(), ObserverError>,
{
    fn on_event(&mut self, event: &CubeEvent) -> Result<(), ObserverError> {
        self(event)
    }
}

/// Observer shared between the bus and its owner
pub type SharedObserver = Rc<RefCell<dyn CubeObserver>>;

/// Handle returned by [`NotificationBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Subscriber list of one datacube node
///
/// Cloning is cheap and yields a snapshot that can deliver without
/// holding a borrow of the node.
#[derive(Clone, Default)]
pub struct NotificationBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, SharedObserver)>,
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl CubeObserver + 'static) -> SubscriptionId {
        self.subscribe_shared(Rc::new(RefCell::new(observer)))
    }

    pub fn subscribe_shared(&mut self, observer: SharedObserver) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, observer));
        id
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Delivers `event` to every observer in subscription order.
    ///
    /// Returns the number of observers reached, or the first failure.
    pub fn publish(&self, event: &CubeEvent) -> Result<usize, ObserverError> {
        for (id, observer) in &self.subscribers {
            let mut observer = observer.try_borrow_mut().map_err(|_| {
                ObserverError::new(format!("{} re-entered while handling an event", id))
            })?;
            observer.on_event(event).map_err(|e| {
                ObserverError::new(format!("{} failed on {}: {}", id, event.as_str(), e))
            })?;
        }
        Ok(self.subscribers.len())
    }
}

/// Observer that records every event it receives
///
/// Clones share the same log, so a clone can be subscribed while the
/// original is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<CubeEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CubeEvent> {
        self.events.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(CubeEvent::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl CubeObserver for EventRecorder {
    fn on_event(&mut self, event: &CubeEvent) -> Result<(), ObserverError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_in_subscription_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bus = NotificationBus::new();
        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            bus.subscribe(move |_: &CubeEvent| -> Result<(), ObserverError> {
                order.borrow_mut().push(tag);
                Ok(())
            });
        }

        assert_eq!(bus.publish(&CubeEvent::ClearRow).unwrap(), 3);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_delivery_stops_at_first_failure() {
        let recorder = EventRecorder::new();
        let mut bus = NotificationBus::new();
        bus.subscribe(|_: &CubeEvent| -> Result<(), ObserverError> {
            Err(ObserverError::new("nope"))
        });
        bus.subscribe(recorder.clone());

        let err = bus.publish(&CubeEvent::Commit { row: 0 }).unwrap_err();
        assert!(err.message().contains("nope"));
        assert!(err.message().contains("commit"));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let recorder = EventRecorder::new();
        let mut bus = NotificationBus::new();
        let id = bus.subscribe(recorder.clone());

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&CubeEvent::ClearRow).unwrap();
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_snapshot_shares_observers() {
        let recorder = EventRecorder::new();
        let mut bus = NotificationBus::new();
        bus.subscribe(recorder.clone());

        let snapshot = bus.clone();
        snapshot.publish(&CubeEvent::SortBy("x".into())).unwrap();
        assert_eq!(recorder.kinds(), vec![EventKind::SortBy]);
    }
}
