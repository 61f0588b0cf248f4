//! Device action
//!
//! Translates a stored rule parameter set into a command issued to a
//! device through the host's device manager.

use std::sync::Arc;

use tracing::debug;

use hub_core::{CommandOrigin, DeviceId, DeviceManager, Method};

use crate::params::{param_i64, Params};

/// Allowed range for the `repeats` parameter
const REPEATS_MIN: i64 = 1;
const REPEATS_MAX: i64 = 10;

/// Sends a command to a device when a rule's actions run
pub struct DeviceAction {
    manager: Arc<dyn DeviceManager>,
    /// Device to command
    pub device_id: DeviceId,
    /// Method to issue; methods without a command name are passed through
    /// unnamed for the device layer to reject
    pub method: Option<Method>,
    /// How many times the host's rule engine re-runs this action, clamped
    /// into [1, 10]
    pub repeats: i64,
    /// Command value (e.g. the dim level)
    pub value: i32,
}

impl DeviceAction {
    /// Build from a stored rule parameter set
    pub fn from_params(manager: Arc<dyn DeviceManager>, params: &Params) -> Self {
        let device_id = DeviceId(param_i64(params, "clientDeviceId").unwrap_or(0) as i32);
        let method = param_i64(params, "method")
            .and_then(|raw| u32::try_from(raw).ok())
            .and_then(Method::from_raw);
        let repeats = param_i64(params, "repeats")
            .unwrap_or(1)
            .clamp(REPEATS_MIN, REPEATS_MAX);
        let value = param_i64(params, "value").unwrap_or(0) as i32;

        Self {
            manager,
            device_id,
            method,
            repeats,
            value,
        }
    }

    /// Issue the configured command
    ///
    /// A missing device is a dangling rule referencing a removed device;
    /// the action degrades to a no-op.
    pub fn execute(&self) {
        let Some(device) = self.manager.device(self.device_id) else {
            debug!(device_id = %self.device_id, "Action skipped, device not found");
            return;
        };

        let action = self.method.and_then(Method::command_name);
        device.command(action, self.value, CommandOrigin::Event);
    }
}

impl std::fmt::Debug for DeviceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceAction")
            .field("device_id", &self.device_id)
            .field("method", &self.method)
            .field("repeats", &self.repeats)
            .field("value", &self.value)
            .finish()
    }
}
