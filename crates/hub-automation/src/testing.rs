//! In-memory device layer for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hub_core::{CommandOrigin, Device, DeviceId, DeviceManager, Method};

/// A command recorded by a mock device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub action: Option<String>,
    pub value: i32,
    pub origin: CommandOrigin,
}

struct MockDevice {
    id: DeviceId,
    state: Mutex<(Option<Method>, String)>,
    commands: Mutex<Vec<SentCommand>>,
}

impl Device for MockDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn state(&self) -> (Option<Method>, String) {
        self.state.lock().unwrap().clone()
    }

    fn command(&self, action: Option<&str>, value: i32, origin: CommandOrigin) {
        self.commands.lock().unwrap().push(SentCommand {
            action: action.map(str::to_string),
            value,
            origin,
        });
    }
}

/// Device manager holding mock devices and recording their commands
#[derive(Default)]
pub struct MockDeviceManager {
    devices: Mutex<HashMap<DeviceId, Arc<MockDevice>>>,
}

impl MockDeviceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a device with the given state
    pub fn add_device(&self, id: DeviceId, method: Option<Method>, state_value: &str) {
        self.devices.lock().unwrap().insert(
            id,
            Arc::new(MockDevice {
                id,
                state: Mutex::new((method, state_value.to_string())),
                commands: Mutex::new(Vec::new()),
            }),
        );
    }

    /// Commands recorded for a device, empty if the device is unknown
    pub fn sent_commands(&self, id: DeviceId) -> Vec<SentCommand> {
        self.devices
            .lock()
            .unwrap()
            .get(&id)
            .map(|d| d.commands.lock().unwrap().clone())
            .unwrap_or_default()
    }
}

impl DeviceManager for MockDeviceManager {
    fn device(&self, id: DeviceId) -> Option<Arc<dyn Device>> {
        self.devices
            .lock()
            .unwrap()
            .get(&id)
            .map(|d| Arc::clone(d) as Arc<dyn Device>)
    }
}
