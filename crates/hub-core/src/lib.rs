//! Core types for the hub
//!
//! This crate provides the fundamental types used throughout the hub
//! extension crates: device/sensor ids, the device method and sensor
//! value-type vocabularies, the collaborator traits for the host's device
//! layer, and the event envelope used on the event bus.

mod device;
mod event;
mod method;

pub use device::{CommandOrigin, Device, DeviceId, DeviceManager, SensorId};
pub use event::{Event, EventData, EventType};
pub use method::{Method, SensorValueType};

/// Identifier for a room, assigned by the cloud service
pub type RoomId = String;

/// Standard event types fired by the hub extension crates
pub mod events {
    use serde::{Deserialize, Serialize};

    use super::{EventData, RoomId};

    /// Event type fired when a room (or other grouping object) changes mode
    pub const MODE_CHANGED: &str = "mode_changed";

    /// Event type fired when an automation trigger fires
    pub const TRIGGER_FIRED: &str = "trigger_fired";

    /// Object type tag for rooms in mode-change notifications
    pub const OBJECT_TYPE_ROOM: &str = "room";

    /// Data for MODE_CHANGED events
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ModeChangedData {
        /// Id of the object whose mode changed
        pub object_id: RoomId,
        /// The new mode
        pub mode: String,
        /// What kind of object this is (`"room"` for rooms)
        pub object_type: String,
        /// Display name of the object
        pub object_name: String,
    }

    impl EventData for ModeChangedData {
        fn event_type() -> &'static str {
            MODE_CHANGED
        }
    }

    /// Data for TRIGGER_FIRED events
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TriggerFiredData {
        /// Registry id of the trigger that fired
        pub trigger_id: u64,
        /// Trigger kind (`"device"` or `"sensor"`)
        pub kind: String,
    }

    impl EventData for TriggerFiredData {
        fn event_type() -> &'static str {
            TRIGGER_FIRED
        }
    }
}
