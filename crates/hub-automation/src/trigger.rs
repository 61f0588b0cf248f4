//! Trigger types
//!
//! Device triggers fire when a device transitions to a specific method.
//! Sensor triggers are stateful hysteresis evaluators: they fire when a
//! sensor value crosses a threshold in the configured direction and then
//! stay quiet until the value has left the reload band around the
//! threshold.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use hub_core::{DeviceId, Method, SensorId, SensorValueType};

use crate::params::{param_f64, param_i64, param_str, ParamError, Params};

/// Lower bound for the reload band
const RELOAD_BAND_MIN: f64 = 0.1;
/// Upper bound for the reload band
const RELOAD_BAND_MAX: f64 = 15.0;

/// A unique identifier for a registered trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u64);

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Crossing direction for a sensor threshold comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Fire when the value rises above the threshold
    Above,
    /// Fire when the value equals the threshold exactly
    Equal,
    /// Fire when the value falls below the threshold
    Below,
}

impl Edge {
    /// Parse the signed integer used in stored rule parameters
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            1 => Some(Edge::Above),
            0 => Some(Edge::Equal),
            -1 => Some(Edge::Below),
            _ => None,
        }
    }

    /// Whether `value` satisfies this edge against `threshold`
    fn crossed(self, value: f64, threshold: f64) -> bool {
        match self {
            Edge::Above => value > threshold,
            Edge::Equal => value == threshold,
            Edge::Below => value < threshold,
        }
    }
}

/// Fires when a device transitions to a specific control method
#[derive(Debug)]
pub struct DeviceTrigger {
    /// Registry id
    pub id: TriggerId,
    /// Device to watch
    pub device_id: DeviceId,
    /// Method to match; `None` (unrecognized or missing in the rule)
    /// never matches
    pub method: Option<Method>,
}

impl DeviceTrigger {
    /// Build from a stored rule parameter set
    ///
    /// Missing or malformed parameters fall back to values that can never
    /// match a real notification, mirroring how a dangling rule behaves.
    pub fn from_params(id: TriggerId, params: &Params) -> Self {
        let device_id = DeviceId(param_i64(params, "clientDeviceId").unwrap_or(0) as i32);
        let method = param_i64(params, "method")
            .and_then(|raw| u32::try_from(raw).ok())
            .and_then(Method::from_raw);
        Self {
            id,
            device_id,
            method,
        }
    }

    /// Whether a state-change notification matches this trigger
    pub fn matches(&self, device_id: DeviceId, method: Method) -> bool {
        self.device_id == device_id && self.method == Some(method)
    }
}

/// Mutable evaluation state of a sensor trigger
#[derive(Debug, Clone, Copy)]
struct HysteresisState {
    /// The threshold has been crossed and not yet re-armed
    triggered: bool,
    /// Still inside the reload band since the last crossing
    require_reload: bool,
    /// No reading accepted yet; the first one must not fire
    first_value: bool,
}

impl Default for HysteresisState {
    fn default() -> Self {
        Self {
            triggered: false,
            require_reload: false,
            first_value: true,
        }
    }
}

/// Fires when a sensor value crosses a threshold, with hysteresis
pub struct SensorTrigger {
    /// Registry id
    pub id: TriggerId,
    /// Sensor to watch
    pub sensor_id: SensorId,
    /// Value type this trigger listens to; readings of any other type are
    /// ignored entirely
    pub value_type: Option<SensorValueType>,
    /// Scale the readings must carry
    pub scale: Option<i32>,
    /// Threshold value
    pub threshold: f64,
    /// Crossing direction
    pub edge: Edge,
    /// Band around the threshold the value must leave before re-arming
    pub reload_band: f64,

    state: Mutex<HysteresisState>,
}

impl std::fmt::Debug for SensorTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorTrigger")
            .field("id", &self.id)
            .field("sensor_id", &self.sensor_id)
            .field("value_type", &self.value_type)
            .field("scale", &self.scale)
            .field("threshold", &self.threshold)
            .field("edge", &self.edge)
            .field("reload_band", &self.reload_band)
            .finish()
    }
}

impl SensorTrigger {
    /// Build from a stored rule parameter set
    ///
    /// `value` (the threshold) and `edge` are required; a rule without
    /// them could never fire, so construction fails instead of
    /// registering a dead trigger. `reloadValue` is clamped into
    /// [0.1, 15.0].
    pub fn from_params(id: TriggerId, params: &Params) -> Result<Self, ParamError> {
        let sensor_id = SensorId(param_i64(params, "clientSensorId").unwrap_or(0) as i32);
        let threshold = param_f64(params, "value").ok_or(ParamError::Missing("value"))?;
        let edge_raw = param_i64(params, "edge").ok_or(ParamError::Missing("edge"))?;
        let edge = Edge::from_raw(edge_raw).ok_or_else(|| ParamError::Invalid {
            name: "edge",
            value: edge_raw.to_string(),
        })?;
        let reload_band = param_f64(params, "reloadValue")
            .unwrap_or(1.0)
            .clamp(RELOAD_BAND_MIN, RELOAD_BAND_MAX);
        let scale = param_i64(params, "scale").map(|s| s as i32);
        let value_type = param_str(params, "valueType").and_then(SensorValueType::from_param);

        Ok(Self {
            id,
            sensor_id,
            value_type,
            scale,
            threshold,
            edge,
            reload_band,
            state: Mutex::new(HysteresisState::default()),
        })
    }

    /// Whether the trigger is currently in its triggered state
    pub fn is_triggered(&self) -> bool {
        self.state.lock().unwrap().triggered
    }

    /// Feed a new sensor reading through the hysteresis state machine
    ///
    /// Returns `true` when the trigger should fire. Readings with a
    /// mismatched value type or scale leave all state untouched, including
    /// the first-value marker. A value that does not parse as a number is
    /// discarded with the state unchanged.
    pub fn handle_update(&self, value_type: SensorValueType, value: &str, scale: i32) -> bool {
        if self.value_type != Some(value_type) || self.scale != Some(scale) {
            return false;
        }

        let value: f64 = match value.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(
                    trigger_id = %self.id,
                    sensor_id = %self.sensor_id,
                    value,
                    "Discarding non-numeric sensor value"
                );
                return false;
            }
        };

        let mut state = self.state.lock().unwrap();
        let mut fire = false;

        if !state.triggered {
            if self.edge.crossed(value, self.threshold) {
                state.triggered = true;
                state.require_reload = true;
                // The first accepted reading reflects stale sensor state;
                // transition without firing.
                if !state.first_value {
                    fire = true;
                }
            }
        } else {
            if state.require_reload {
                state.require_reload = (value - self.threshold).abs() < self.reload_band;
            }
            if !state.require_reload {
                if self.edge == Edge::Equal {
                    state.triggered = false;
                } else {
                    state.triggered = self.edge.crossed(value, self.threshold);
                }
            }
        }

        state.first_value = false;

        trace!(
            trigger_id = %self.id,
            value,
            triggered = state.triggered,
            require_reload = state.require_reload,
            fire,
            "Sensor trigger evaluated"
        );

        fire
    }
}
