//! The room manager
//!
//! Holds and manages all rooms known to this process. Rooms are mutated
//! by inbound cloud messages and by local mode changes; every mutation
//! persists the full room map through the settings store, and changes to
//! rooms this process owns are echoed back to the cloud.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use hub_core::events::{ModeChangedData, OBJECT_TYPE_ROOM};
use hub_core::RoomId;
use hub_event_bus::SharedEventBus;

use crate::cloud::{CloudClient, CloudMessage, RoomAction, RoomMessage};
use crate::room::Room;
use crate::storage::{SettingsStore, Storable};

/// The persisted room map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomsData {
    /// All rooms keyed by id
    pub rooms: HashMap<RoomId, Room>,
}

impl Storable for RoomsData {
    const KEY: &'static str = "hub.rooms";
    const VERSION: u32 = 1;
}

/// Holds and manages all the rooms in the server
///
/// The map is guarded by one mutex held for the duration of each
/// operation; observers never see a partially applied mutation.
pub struct RoomManager {
    rooms: Mutex<HashMap<RoomId, Room>>,
    store: SettingsStore,
    cloud: Arc<dyn CloudClient>,
    bus: SharedEventBus,
}

impl RoomManager {
    /// Create a room manager with an empty map
    pub fn new(store: SettingsStore, cloud: Arc<dyn CloudClient>, bus: SharedEventBus) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            store,
            cloud,
            bus,
        }
    }

    /// Populate the map from the settings store
    pub async fn load(&self) -> Result<(), crate::storage::SettingsError> {
        if let Some(data) = self.store.load::<RoomsData>().await? {
            info!(count = data.rooms.len(), "Loaded rooms from settings");
            *self.rooms.lock().await = data.rooms;
        }
        Ok(())
    }

    /// Number of rooms currently held
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// A snapshot of a room by id
    pub async fn room(&self, room_id: &str) -> Option<Room> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    /// Set a room to a new mode
    ///
    /// Unknown rooms are a no-op. A changed mode is persisted and, when
    /// this process owns the room and has a registered cloud account,
    /// announced with a `RoomModeSet` message. The local `mode_changed`
    /// notification fires for every known room, changed or not.
    pub async fn set_mode(&self, room_id: &str, mode: &str) {
        let mut rooms = self.rooms.lock().await;
        self.set_mode_locked(&mut rooms, room_id, mode).await;
    }

    async fn set_mode_locked(&self, rooms: &mut HashMap<RoomId, Room>, room_id: &str, mode: &str) {
        let Some(room) = rooms.get_mut(room_id) else {
            debug!(room_id, "Mode change for unknown room ignored");
            return;
        };

        if room.mode != mode {
            room.mode = mode.to_string();
            let name = room.name.clone();
            let owned = room.responsible == self.cloud.uuid();
            self.persist(rooms).await;

            if self.cloud.registered() && owned {
                // Notify the cloud if we are the owner
                self.cloud.send(CloudMessage::room_mode_set(room_id, mode));
            }

            info!(room_id, mode, "Room mode changed");
            self.notify_mode_changed(room_id, mode, &name);
        } else {
            let name = rooms[room_id].name.clone();
            self.notify_mode_changed(room_id, mode, &name);
        }
    }

    /// Apply an inbound message from the `room` cloud topic
    ///
    /// Malformed payloads and unknown actions are ignored.
    pub async fn handle_message(&self, payload: serde_json::Value) {
        let message: RoomMessage = match serde_json::from_value(payload) {
            Ok(message) => message,
            Err(err) => {
                warn!(%err, "Discarding malformed room message");
                return;
            }
        };

        match message.action {
            RoomAction::Set => self.apply_set(message).await,
            RoomAction::Remove => self.apply_remove(message).await,
            RoomAction::SetMode => {
                let room_id = message.id.unwrap_or_default();
                let mode = message.mode.unwrap_or_default();
                self.set_mode(&room_id, &mode).await;
            }
            RoomAction::Unknown => debug!("Ignoring room message with unknown action"),
        }
    }

    async fn apply_set(&self, message: RoomMessage) {
        let Some(room_id) = message.id else {
            warn!("Room set message without id");
            return;
        };

        let mut rooms = self.rooms.lock().await;

        let old_responsible;
        let snapshot = match rooms.get_mut(&room_id) {
            Some(room) => {
                old_responsible = room.responsible.clone();
                // Only the fields present in the message are overwritten
                if let Some(name) = message.name {
                    room.name = name;
                }
                if let Some(color) = message.color {
                    room.color = color;
                }
                if let Some(content) = message.content {
                    room.content = content;
                }
                if let Some(icon) = message.icon {
                    room.icon = icon;
                }
                if let Some(responsible) = message.responsible {
                    room.responsible = responsible;
                }
                room.clone()
            }
            None => {
                let Some(responsible) = message.responsible else {
                    warn!(%room_id, "New room without a responsible client");
                    return;
                };
                old_responsible = String::new();
                let room = Room {
                    name: message.name.unwrap_or_default(),
                    parent: message.parent.unwrap_or_default(),
                    color: message.color.unwrap_or_default(),
                    content: message.content.unwrap_or_default(),
                    icon: message.icon.unwrap_or_default(),
                    responsible,
                    mode: message.mode.unwrap_or_default(),
                };
                rooms.insert(room_id.clone(), room.clone());
                info!(%room_id, name = %room.name, "Created room");
                room
            }
        };

        // Echo the full room when we own it now or owned it before this
        // update; the latter covers ownership hand-off.
        let uuid = self.cloud.uuid();
        if self.cloud.registered() && (snapshot.responsible == uuid || old_responsible == uuid) {
            self.cloud.send(CloudMessage::room_set(&room_id, &snapshot));
        }

        self.persist(&rooms).await;
    }

    async fn apply_remove(&self, message: RoomMessage) {
        let Some(room_id) = message.id else {
            warn!("Room remove message without id");
            return;
        };

        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.remove(&room_id) else {
            debug!(%room_id, "Remove for unknown room ignored");
            return;
        };

        if self.cloud.registered() && room.responsible == self.cloud.uuid() {
            self.cloud.send(CloudMessage::room_removed(&room_id));
        }

        info!(%room_id, "Removed room");
        self.persist(&rooms).await;
    }

    /// Write the full room map to the settings store
    async fn persist(&self, rooms: &HashMap<RoomId, Room>) {
        let data = RoomsData {
            rooms: rooms.clone(),
        };
        if let Err(err) = self.store.save(&data).await {
            error!(%err, "Failed to persist room map");
        }
    }

    fn notify_mode_changed(&self, room_id: &str, mode: &str, name: &str) {
        self.bus.fire_typed(ModeChangedData {
            object_id: room_id.to_string(),
            mode: mode.to_string(),
            object_type: OBJECT_TYPE_ROOM.to_string(),
            object_name: name.to_string(),
        });
    }
}
