//! Event factory and trigger registry
//!
//! The factory is the host rule engine's entry point: it constructs
//! actions, conditions and triggers from stored rule parameters, owns the
//! lifetime of every trigger it creates, and routes device-state and
//! sensor-value notifications to the triggers that match. A trigger that
//! matches fires a `trigger_fired` event on the bus for the rule engine
//! to pick up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, trace, warn};

use hub_core::events::TriggerFiredData;
use hub_core::{DeviceId, DeviceManager, Method, SensorId, SensorValueType};
use hub_event_bus::SharedEventBus;

use crate::action::DeviceAction;
use crate::condition::DeviceCondition;
use crate::params::{param_i64, Params};
use crate::trigger::{DeviceTrigger, SensorTrigger, TriggerId};

/// Trigger kind tag carried in `trigger_fired` events
const KIND_DEVICE: &str = "device";
/// Trigger kind tag carried in `trigger_fired` events
const KIND_SENSOR: &str = "sensor";

/// Handle to a registered trigger
///
/// The registry keeps its own reference; the handle lets the host
/// associate the trigger with its rule and remove it later.
#[derive(Debug, Clone)]
pub enum TriggerHandle {
    Device(Arc<DeviceTrigger>),
    Sensor(Arc<SensorTrigger>),
}

impl TriggerHandle {
    /// The registry id of this trigger
    pub fn id(&self) -> TriggerId {
        match self {
            TriggerHandle::Device(t) => t.id,
            TriggerHandle::Sensor(t) => t.id,
        }
    }

    /// The trigger kind tag
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerHandle::Device(_) => KIND_DEVICE,
            TriggerHandle::Sensor(_) => KIND_SENSOR,
        }
    }
}

/// Factory and registry for rule-engine items backed by the device layer
pub struct EventFactory {
    manager: Arc<dyn DeviceManager>,
    bus: SharedEventBus,
    device_triggers: RwLock<Vec<Arc<DeviceTrigger>>>,
    sensor_triggers: RwLock<Vec<Arc<SensorTrigger>>>,
    next_trigger_id: AtomicU64,
}

impl EventFactory {
    /// Create a new factory
    pub fn new(manager: Arc<dyn DeviceManager>, bus: SharedEventBus) -> Self {
        Self {
            manager,
            bus,
            device_triggers: RwLock::new(Vec::new()),
            sensor_triggers: RwLock::new(Vec::new()),
            next_trigger_id: AtomicU64::new(1),
        }
    }

    /// Construct an action from stored rule parameters
    ///
    /// Only `"device"` actions carrying the `local == 1` capability flag
    /// belong to this factory; anything else returns `None` for another
    /// factory to claim.
    pub fn create_action(&self, kind: &str, params: &Params) -> Option<DeviceAction> {
        match kind {
            "device" if param_i64(params, "local") == Some(1) => {
                Some(DeviceAction::from_params(Arc::clone(&self.manager), params))
            }
            _ => None,
        }
    }

    /// Construct a condition from stored rule parameters
    ///
    /// Gated the same way as [`create_action`](Self::create_action).
    pub fn create_condition(&self, kind: &str, params: &Params) -> Option<DeviceCondition> {
        match kind {
            "device" if param_i64(params, "local") == Some(1) => Some(
                DeviceCondition::from_params(Arc::clone(&self.manager), params),
            ),
            _ => None,
        }
    }

    /// Construct and register a trigger from stored rule parameters
    ///
    /// Unknown kinds, and sensor rules missing a usable threshold or
    /// edge, return `None`.
    pub fn create_trigger(&self, kind: &str, params: &Params) -> Option<TriggerHandle> {
        let id = TriggerId(self.next_trigger_id.fetch_add(1, Ordering::SeqCst));
        match kind {
            "device" => {
                let trigger = Arc::new(DeviceTrigger::from_params(id, params));
                debug!(trigger_id = %id, ?trigger, "Registered device trigger");
                self.device_triggers.write().unwrap().push(Arc::clone(&trigger));
                Some(TriggerHandle::Device(trigger))
            }
            "sensor" => {
                let trigger = match SensorTrigger::from_params(id, params) {
                    Ok(trigger) => Arc::new(trigger),
                    Err(err) => {
                        warn!(%err, "Rejected sensor trigger");
                        return None;
                    }
                };
                debug!(trigger_id = %id, ?trigger, "Registered sensor trigger");
                self.sensor_triggers.write().unwrap().push(Arc::clone(&trigger));
                Some(TriggerHandle::Sensor(trigger))
            }
            _ => None,
        }
    }

    /// Remove a trigger from the registry
    ///
    /// Called when the owning rule is unloaded. Returns whether a trigger
    /// was removed.
    pub fn remove_trigger(&self, id: TriggerId) -> bool {
        let mut devices = self.device_triggers.write().unwrap();
        let before = devices.len();
        devices.retain(|t| t.id != id);
        if devices.len() != before {
            return true;
        }
        drop(devices);

        let mut sensors = self.sensor_triggers.write().unwrap();
        let before = sensors.len();
        sensors.retain(|t| t.id != id);
        sensors.len() != before
    }

    /// Number of registered triggers
    pub fn trigger_count(&self) -> usize {
        self.device_triggers.read().unwrap().len() + self.sensor_triggers.read().unwrap().len()
    }

    /// Route a device state-change notification
    ///
    /// Every device trigger whose (device, method) pair matches exactly
    /// fires. Unrecognized method codes match nothing.
    pub fn on_device_state_changed(&self, device_id: DeviceId, method_raw: u32) {
        let Some(method) = Method::from_raw(method_raw) else {
            trace!(%device_id, method_raw, "Ignoring state change with unknown method");
            return;
        };

        for trigger in self.device_triggers.read().unwrap().iter() {
            if trigger.matches(device_id, method) {
                debug!(trigger_id = %trigger.id, %device_id, ?method, "Device trigger fired");
                self.bus.fire_typed(TriggerFiredData {
                    trigger_id: trigger.id.0,
                    kind: KIND_DEVICE.to_string(),
                });
            }
        }
    }

    /// Route a sensor value notification
    ///
    /// Every sensor trigger watching this sensor id sees the reading;
    /// filtering on value type and scale is the trigger's own job.
    pub fn on_sensor_value_updated(
        &self,
        sensor_id: SensorId,
        value_type_raw: u32,
        value: &str,
        scale: i32,
    ) {
        let Some(value_type) = SensorValueType::from_raw(value_type_raw) else {
            trace!(%sensor_id, value_type_raw, "Ignoring reading with unknown value type");
            return;
        };

        for trigger in self.sensor_triggers.read().unwrap().iter() {
            if trigger.sensor_id != sensor_id {
                continue;
            }
            if trigger.handle_update(value_type, value, scale) {
                debug!(trigger_id = %trigger.id, %sensor_id, "Sensor trigger fired");
                self.bus.fire_typed(TriggerFiredData {
                    trigger_id: trigger.id.0,
                    kind: KIND_SENSOR.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDeviceManager;
    use hub_event_bus::EventBus;
    use serde_json::json;

    fn make_factory() -> (EventFactory, SharedEventBus) {
        let bus = Arc::new(EventBus::new());
        let manager = Arc::new(MockDeviceManager::new());
        (EventFactory::new(manager, Arc::clone(&bus)), bus)
    }

    fn device_trigger_params(device_id: i64, method: i64) -> Params {
        [
            ("clientDeviceId".to_string(), json!(device_id)),
            ("method".to_string(), json!(method)),
        ]
        .into_iter()
        .collect()
    }

    fn sensor_trigger_params(sensor_id: i64) -> Params {
        [
            ("clientSensorId".to_string(), json!(sensor_id)),
            ("value".to_string(), json!(20.0)),
            ("edge".to_string(), json!(1)),
            ("reloadValue".to_string(), json!(2.0)),
            ("scale".to_string(), json!(0)),
            ("valueType".to_string(), json!("temp")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_unknown_kind_returns_none() {
        let (factory, _bus) = make_factory();
        assert!(factory.create_trigger("weather", &Params::new()).is_none());
        assert!(factory.create_action("group", &Params::new()).is_none());
        assert!(factory.create_condition("time", &Params::new()).is_none());
        assert_eq!(factory.trigger_count(), 0);
    }

    #[test]
    fn test_action_requires_local_flag() {
        let (factory, _bus) = make_factory();

        let mut params = device_trigger_params(1, 1);
        assert!(factory.create_action("device", &params).is_none());

        params.insert("local".to_string(), json!(0));
        assert!(factory.create_action("device", &params).is_none());
        assert!(factory.create_condition("device", &params).is_none());

        params.insert("local".to_string(), json!(1));
        assert!(factory.create_action("device", &params).is_some());
        assert!(factory.create_condition("device", &params).is_some());
    }

    #[tokio::test]
    async fn test_device_dispatch_exact_match() {
        let (factory, bus) = make_factory();
        let mut rx = bus.subscribe_typed::<TriggerFiredData>();

        let handle = factory
            .create_trigger("device", &device_trigger_params(3, 1))
            .unwrap();
        factory
            .create_trigger("device", &device_trigger_params(3, 2))
            .unwrap();

        // Wrong device, wrong method, unknown method code: nothing fires.
        factory.on_device_state_changed(DeviceId(4), 1);
        factory.on_device_state_changed(DeviceId(3), 16);
        factory.on_device_state_changed(DeviceId(3), 7);

        factory.on_device_state_changed(DeviceId(3), 1);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.data.trigger_id, handle.id().0);
        assert_eq!(event.data.kind, "device");
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn test_sensor_dispatch_routes_by_id_only() {
        let (factory, bus) = make_factory();
        let mut rx = bus.subscribe_typed::<TriggerFiredData>();

        let handle = factory
            .create_trigger("sensor", &sensor_trigger_params(7))
            .unwrap();
        factory
            .create_trigger("sensor", &sensor_trigger_params(8))
            .unwrap();

        // First accepted value: transition, no fire.
        factory.on_sensor_value_updated(SensorId(7), 1, "25.0", 0);
        // Re-arm, then fire.
        factory.on_sensor_value_updated(SensorId(7), 1, "15.0", 0);
        factory.on_sensor_value_updated(SensorId(7), 1, "25.0", 0);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.data.trigger_id, handle.id().0);
        assert_eq!(event.data.kind, "sensor");
        assert!(rx.is_empty());

        // A reading with a scale the trigger does not listen to is routed
        // but filtered inside the trigger.
        factory.on_sensor_value_updated(SensorId(7), 1, "30.0", 1);
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn test_removed_trigger_no_longer_fires() {
        let (factory, bus) = make_factory();
        let mut rx = bus.subscribe_typed::<TriggerFiredData>();

        let handle = factory
            .create_trigger("device", &device_trigger_params(3, 1))
            .unwrap();
        assert_eq!(factory.trigger_count(), 1);

        assert!(factory.remove_trigger(handle.id()));
        assert!(!factory.remove_trigger(handle.id()));
        assert_eq!(factory.trigger_count(), 0);

        factory.on_device_state_changed(DeviceId(3), 1);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_sensor_trigger_with_bad_edge_not_registered() {
        let (factory, _bus) = make_factory();
        let mut params = sensor_trigger_params(7);
        params.insert("edge".to_string(), json!(5));
        assert!(factory.create_trigger("sensor", &params).is_none());
        assert_eq!(factory.trigger_count(), 0);
    }
}
