//! Room state store with settings persistence and cloud synchronization
//!
//! Rooms group devices and carry a mode (day, night, away, ...). The
//! canonical room list lives in the cloud service; this crate holds the
//! local mirror, applies inbound `room` messages, persists the map
//! through the settings store, and echoes changes to rooms this process
//! owns back to the cloud.

mod cloud;
mod manager;
mod room;
mod storage;

pub use cloud::{CloudClient, CloudMessage, RoomAction, RoomMessage, ROOM_TOPIC};
pub use manager::{RoomManager, RoomsData};
pub use room::Room;
pub use storage::{SettingsError, SettingsFile, SettingsResult, SettingsStore, Storable};
