//! Rule-engine event factory for the hub
//!
//! This crate wires the host's devices and sensors into its rule engine:
//! device and sensor triggers detect state changes and value crossings,
//! device actions issue commands, and device conditions read current
//! state. The [`EventFactory`] implements the host's factory and
//! device-change observer extension points and owns all trigger
//! lifetimes.

mod action;
mod condition;
mod factory;
mod params;
mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub use action::DeviceAction;
pub use condition::DeviceCondition;
pub use factory::{EventFactory, TriggerHandle};
pub use params::{param_f64, param_i64, param_str, ParamError, Params};
pub use trigger::{DeviceTrigger, Edge, SensorTrigger, TriggerId};
