//! Device condition
//!
//! A pure read against the device layer: succeeds when the device's
//! current state matches the configured method.

use std::sync::Arc;

use tracing::debug;

use hub_core::{DeviceId, DeviceManager, Method};

use crate::params::{param_i64, Params};

/// Checks a device's current state when a rule's conditions are evaluated
pub struct DeviceCondition {
    manager: Arc<dyn DeviceManager>,
    /// Device to check
    pub device_id: DeviceId,
    /// Method the device state must equal
    pub method: Option<Method>,
}

impl DeviceCondition {
    /// Build from a stored rule parameter set
    pub fn from_params(manager: Arc<dyn DeviceManager>, params: &Params) -> Self {
        let device_id = DeviceId(param_i64(params, "clientDeviceId").unwrap_or(0) as i32);
        let method = param_i64(params, "method")
            .and_then(|raw| u32::try_from(raw).ok())
            .and_then(Method::from_raw);
        Self {
            manager,
            device_id,
            method,
        }
    }

    /// Evaluate the condition against the device's current state
    ///
    /// A missing device fails the condition. No side effects.
    pub fn validate(&self) -> bool {
        let Some(device) = self.manager.device(self.device_id) else {
            debug!(device_id = %self.device_id, "Condition failed, device not found");
            return false;
        };

        let (state, _state_value) = device.state();
        state.is_some() && state == self.method
    }
}

impl std::fmt::Debug for DeviceCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCondition")
            .field("device_id", &self.device_id)
            .field("method", &self.method)
            .finish()
    }
}
