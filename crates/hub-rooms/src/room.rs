//! The room entry

use serde::{Deserialize, Serialize};

/// A room as held in the room map
///
/// Every field is always present once the room exists; fields the
/// creating message omitted are empty strings. Callers can rely on no
/// field ever being missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Parent room id, empty for top-level rooms
    #[serde(default)]
    pub parent: String,

    /// Display color
    #[serde(default)]
    pub color: String,

    /// Content tag describing what the room holds
    #[serde(default)]
    pub content: String,

    /// Display icon
    #[serde(default)]
    pub icon: String,

    /// Cloud identity of the client that owns this room's canonical state
    #[serde(default)]
    pub responsible: String,

    /// Current mode
    #[serde(default)]
    pub mode: String,
}
