//! Typed pub/sub event bus for local hub notifications
//!
//! The bus replaces the host's signal mechanism with an explicit broker:
//! components fire events (`mode_changed`, `trigger_fired`) and any number
//! of subscribers receive them. Firing never blocks and never fails; an
//! event with no subscribers is simply dropped.

use dashmap::DashMap;
use hub_core::{Event, EventData, EventType};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default channel capacity for event subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// The event bus for publishing and subscribing to hub events
pub struct EventBus {
    /// Map of event types to their broadcast senders
    listeners: DashMap<EventType, broadcast::Sender<Event<serde_json::Value>>>,
    /// Sender for match-all subscribers
    match_all_sender: broadcast::Sender<Event<serde_json::Value>>,
    /// Channel capacity
    capacity: usize,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event bus with the given channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (match_all_sender, _) = broadcast::channel(capacity);
        Self {
            listeners: DashMap::new(),
            match_all_sender,
            capacity,
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe(
        &self,
        event_type: impl Into<EventType>,
    ) -> broadcast::Receiver<Event<serde_json::Value>> {
        let event_type = event_type.into();
        trace!(event_type = %event_type, "Subscribing to event type");

        if event_type.is_match_all() {
            return self.match_all_sender.subscribe();
        }

        self.listeners
            .entry(event_type)
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.capacity);
                tx
            })
            .subscribe()
    }

    /// Subscribe to a typed event
    ///
    /// Returns a receiver that yields events with parsed data.
    pub fn subscribe_typed<T: EventData + serde::de::DeserializeOwned>(
        &self,
    ) -> TypedEventReceiver<T> {
        let rx = self.subscribe(T::event_type());
        TypedEventReceiver::new(rx)
    }

    /// Subscribe to all events
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event<serde_json::Value>> {
        self.match_all_sender.subscribe()
    }

    /// Fire an event to all subscribers
    pub fn fire(&self, event: Event<serde_json::Value>) {
        debug!(event_type = %event.event_type, "Firing event");

        if let Some(sender) = self.listeners.get(&event.event_type) {
            // Send errors just mean no active receivers
            let _ = sender.send(event.clone());
        }

        let _ = self.match_all_sender.send(event);
    }

    /// Fire a typed event
    pub fn fire_typed<T: EventData + serde::Serialize>(&self, data: T) {
        let json_data = serde_json::to_value(&data).unwrap_or_default();
        self.fire(Event::new(T::event_type(), json_data));
    }

    /// Number of event types with at least one past subscription
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A receiver for typed events
pub struct TypedEventReceiver<T> {
    rx: broadcast::Receiver<Event<serde_json::Value>>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: EventData + serde::de::DeserializeOwned> TypedEventReceiver<T> {
    fn new(rx: broadcast::Receiver<Event<serde_json::Value>>) -> Self {
        Self {
            rx,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Receive the next typed event
    ///
    /// Events whose data fails to deserialize are skipped.
    pub async fn recv(&mut self) -> Result<Event<T>, broadcast::error::RecvError> {
        loop {
            let event = self.rx.recv().await?;
            if let Ok(data) = serde_json::from_value::<T>(event.data.clone()) {
                return Ok(Event {
                    event_type: event.event_type,
                    data,
                    time_fired: event.time_fired,
                });
            }
        }
    }

    /// Receive the next typed event without waiting
    pub fn try_recv(&mut self) -> Result<Event<T>, broadcast::error::TryRecvError> {
        loop {
            let event = self.rx.try_recv()?;
            if let Ok(data) = serde_json::from_value::<T>(event.data.clone()) {
                return Ok(Event {
                    event_type: event.event_type,
                    data,
                    time_fired: event.time_fired,
                });
            }
        }
    }

    /// Whether the underlying channel has no pending events
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Thread-safe handle to an event bus
pub type SharedEventBus = Arc<EventBus>;

#[cfg(test)]
mod tests {
    use super::*;
    use hub_core::events::{ModeChangedData, MODE_CHANGED, OBJECT_TYPE_ROOM};
    use serde_json::json;

    #[tokio::test]
    async fn test_subscribe_and_fire() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe(MODE_CHANGED);

        bus.fire(Event::new(MODE_CHANGED, json!({"mode": "night"})));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type.as_str(), MODE_CHANGED);
        assert_eq!(received.data["mode"], "night");
    }

    #[tokio::test]
    async fn test_match_all_subscription() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_all();

        bus.fire(Event::new("event_a", json!({})));
        bus.fire(Event::new("event_b", json!({})));

        assert_eq!(rx.recv().await.unwrap().event_type.as_str(), "event_a");
        assert_eq!(rx.recv().await.unwrap().event_type.as_str(), "event_b");
    }

    #[tokio::test]
    async fn test_typed_subscription() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_typed::<ModeChangedData>();

        bus.fire_typed(ModeChangedData {
            object_id: "r1".to_string(),
            mode: "away".to_string(),
            object_type: OBJECT_TYPE_ROOM.to_string(),
            object_name: "Kitchen".to_string(),
        });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.data.object_id, "r1");
        assert_eq!(received.data.mode, "away");
        assert_eq!(received.data.object_type, "room");
    }

    #[tokio::test]
    async fn test_no_cross_event_pollution() {
        let bus = EventBus::new();
        let mut rx_a = bus.subscribe("event_a");
        let mut rx_b = bus.subscribe("event_b");

        bus.fire(Event::new("event_a", json!({"type": "a"})));

        let received = rx_a.recv().await.unwrap();
        assert_eq!(received.data["type"], "a");
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_typed_receiver_skips_undecodable() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_typed::<ModeChangedData>();

        // Not a ModeChangedData payload; the typed receiver skips it
        bus.fire(Event::new(MODE_CHANGED, json!({"garbage": true})));
        bus.fire_typed(ModeChangedData {
            object_id: "r2".to_string(),
            mode: "home".to_string(),
            object_type: OBJECT_TYPE_ROOM.to_string(),
            object_name: "Hall".to_string(),
        });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.data.object_id, "r2");
    }
}
