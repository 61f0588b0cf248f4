//! Device and sensor identifiers plus the collaborator traits for the
//! host's device layer
//!
//! The hub never owns devices; it references them by id and talks to them
//! through `DeviceManager`. Implementations live in the host server.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Method;

/// Identifier for a device, assigned by the host's device manager
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeviceId(pub i32);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a sensor, assigned by the host's device manager
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SensorId(pub i32);

impl std::fmt::Display for SensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a device command originated
///
/// Commands issued by the automation engine are tagged `Event` so the
/// layers below can tell them apart from direct user actions and avoid
/// feedback loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOrigin {
    /// Issued by the rule engine
    Event,
    /// Issued directly by a user
    User,
    /// Mirrored from the cloud service
    Cloud,
}

impl std::fmt::Display for CommandOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandOrigin::Event => write!(f, "Event"),
            CommandOrigin::User => write!(f, "User"),
            CommandOrigin::Cloud => write!(f, "Cloud"),
        }
    }
}

/// A device managed by the host
///
/// `state` returns the last method applied to the device together with its
/// state value (e.g. the dim level). A device whose state has never been
/// set, or whose state the host reports with an unrecognized method code,
/// yields `None` for the method.
pub trait Device: Send + Sync {
    /// The device's id
    fn id(&self) -> DeviceId;

    /// Current (method, state value) pair
    fn state(&self) -> (Option<Method>, String);

    /// Issue a command to the device
    ///
    /// `action` is the command name (`"turnon"`, `"turnoff"`, `"dim"`);
    /// a command without a name is passed through for the device layer to
    /// reject or ignore.
    fn command(&self, action: Option<&str>, value: i32, origin: CommandOrigin);
}

/// The host's device manager
pub trait DeviceManager: Send + Sync {
    /// Look up a device by id
    ///
    /// Returns `None` for removed or unknown devices; rules referencing a
    /// dangling id degrade to no-ops rather than failing.
    fn device(&self, id: DeviceId) -> Option<Arc<dyn Device>>;
}
