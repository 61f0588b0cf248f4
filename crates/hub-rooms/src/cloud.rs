//! Cloud message model and client interface
//!
//! The transport itself lives in the host; this module defines the
//! messages the room store exchanges over it and the client seam the
//! store talks to.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use hub_core::RoomId;

use crate::room::Room;

/// Inbound topic the host routes to the room manager
pub const ROOM_TOPIC: &str = "room";

/// An outbound message to the cloud service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudMessage {
    /// Message name
    pub name: String,
    /// Message payload
    pub payload: serde_json::Value,
}

impl CloudMessage {
    /// A mode change for a room we own
    pub fn room_mode_set(id: &str, mode: &str) -> Self {
        Self {
            name: "RoomModeSet".to_string(),
            payload: json!({ "id": id, "mode": mode }),
        }
    }

    /// A full-room snapshot
    ///
    /// Every field is present; rooms never have missing attributes once
    /// created.
    pub fn room_set(id: &str, room: &Room) -> Self {
        Self {
            name: "RoomSet".to_string(),
            payload: json!({
                "id": id,
                "name": room.name,
                "parent": room.parent,
                "color": room.color,
                "content": room.content,
                "icon": room.icon,
                "responsible": room.responsible,
                "mode": room.mode,
            }),
        }
    }

    /// A room removal for a room we owned
    pub fn room_removed(id: &str) -> Self {
        Self {
            name: "RoomRemoved".to_string(),
            payload: json!({ "id": id }),
        }
    }
}

/// Client seam to the host's cloud connection
pub trait CloudClient: Send + Sync {
    /// Whether this process has a registered cloud account
    fn registered(&self) -> bool;

    /// This process's cloud identity
    fn uuid(&self) -> String;

    /// Send a message to the cloud service
    fn send(&self, message: CloudMessage);
}

/// Action carried by an inbound room message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomAction {
    Set,
    Remove,
    SetMode,
    /// Anything this version does not understand; ignored
    Unknown,
}

impl<'de> Deserialize<'de> for RoomAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "set" => RoomAction::Set,
            "remove" => RoomAction::Remove,
            "setMode" => RoomAction::SetMode,
            _ => RoomAction::Unknown,
        })
    }
}

/// An inbound message on the `room` topic
#[derive(Debug, Clone, Deserialize)]
pub struct RoomMessage {
    /// What to do
    pub action: RoomAction,

    /// Room id
    #[serde(default)]
    pub id: Option<RoomId>,

    /// Display name; older transports sent this as an integer
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub responsible: Option<String>,

    #[serde(default)]
    pub mode: Option<String>,
}

/// Accept a string or a number, stringifying the latter
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
