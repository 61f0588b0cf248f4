//! Device method and sensor value-type vocabularies
//!
//! Both enums carry the wire integer values used by the host's device
//! layer and the rule parameter format.

use serde::{Deserialize, Serialize};

/// A device control method
///
/// The discriminants are the wire values the host reports in state-change
/// notifications and stores in rule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum Method {
    TurnOn = 1,
    TurnOff = 2,
    Bell = 4,
    Toggle = 8,
    Dim = 16,
    Learn = 32,
    Execute = 64,
    Up = 128,
    Down = 256,
    Stop = 512,
}

impl Method {
    /// Parse a raw wire value
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Method::TurnOn),
            2 => Some(Method::TurnOff),
            4 => Some(Method::Bell),
            8 => Some(Method::Toggle),
            16 => Some(Method::Dim),
            32 => Some(Method::Learn),
            64 => Some(Method::Execute),
            128 => Some(Method::Up),
            256 => Some(Method::Down),
            512 => Some(Method::Stop),
            _ => None,
        }
    }

    /// The raw wire value
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// The command name the device layer accepts for this method
    ///
    /// Only a subset of methods map to commands the automation engine can
    /// issue; the rest return `None` and the command is sent without a
    /// name for the device layer to reject or ignore.
    pub fn command_name(self) -> Option<&'static str> {
        match self {
            Method::TurnOn => Some("turnon"),
            Method::TurnOff => Some("turnoff"),
            Method::Dim => Some("dim"),
            _ => None,
        }
    }
}

/// The kind of value a sensor reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum SensorValueType {
    Temperature = 1,
    Humidity = 2,
    RainRate = 4,
    RainTotal = 8,
    WindDirection = 16,
    WindAverage = 32,
    WindGust = 64,
    Uv = 128,
    Watt = 256,
    Luminance = 512,
}

impl SensorValueType {
    /// Parse a raw wire value
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(SensorValueType::Temperature),
            2 => Some(SensorValueType::Humidity),
            4 => Some(SensorValueType::RainRate),
            8 => Some(SensorValueType::RainTotal),
            16 => Some(SensorValueType::WindDirection),
            32 => Some(SensorValueType::WindAverage),
            64 => Some(SensorValueType::WindGust),
            128 => Some(SensorValueType::Uv),
            256 => Some(SensorValueType::Watt),
            512 => Some(SensorValueType::Luminance),
            _ => None,
        }
    }

    /// The raw wire value
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Parse the spelling used in stored rule parameters
    pub fn from_param(name: &str) -> Option<Self> {
        match name {
            "temperature" | "temp" => Some(SensorValueType::Temperature),
            "humidity" => Some(SensorValueType::Humidity),
            "rrate" => Some(SensorValueType::RainRate),
            "wavg" => Some(SensorValueType::WindAverage),
            "wgust" => Some(SensorValueType::WindGust),
            "uv" => Some(SensorValueType::Uv),
            "watt" => Some(SensorValueType::Watt),
            "lum" => Some(SensorValueType::Luminance),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_raw_round_trip() {
        for method in [
            Method::TurnOn,
            Method::TurnOff,
            Method::Bell,
            Method::Toggle,
            Method::Dim,
            Method::Learn,
            Method::Execute,
            Method::Up,
            Method::Down,
            Method::Stop,
        ] {
            assert_eq!(Method::from_raw(method.raw()), Some(method));
        }
        assert_eq!(Method::from_raw(0), None);
        assert_eq!(Method::from_raw(3), None);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Method::TurnOn.command_name(), Some("turnon"));
        assert_eq!(Method::TurnOff.command_name(), Some("turnoff"));
        assert_eq!(Method::Dim.command_name(), Some("dim"));
        assert_eq!(Method::Bell.command_name(), None);
        assert_eq!(Method::Stop.command_name(), None);
    }

    #[test]
    fn test_value_type_param_spellings() {
        assert_eq!(
            SensorValueType::from_param("temperature"),
            Some(SensorValueType::Temperature)
        );
        assert_eq!(
            SensorValueType::from_param("temp"),
            Some(SensorValueType::Temperature)
        );
        assert_eq!(
            SensorValueType::from_param("wgust"),
            Some(SensorValueType::WindGust)
        );
        assert_eq!(SensorValueType::from_param("pressure"), None);
    }
}
