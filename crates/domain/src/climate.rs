//! Climate value objects: thermostat readings, HVAC modes, and the
//! commands a climate entity accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, ValidationError};

/// The only preset the thermostat exposes.
pub const PRESET_MANUAL: &str = "Manual";

/// Last-known readings of a thermostat zone.
///
/// Both fields are written together from one fetch cycle; `None` means the
/// last fetch did not produce data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Measured room temperature.
    pub temperature: Option<f64>,
    /// Target setpoint.
    pub temperature_set: Option<f64>,
}

impl DeviceState {
    #[must_use]
    pub fn new(temperature: f64, temperature_set: f64) -> Self {
        Self {
            temperature: Some(temperature),
            temperature_set: Some(temperature_set),
        }
    }

    /// State recorded after a failed fetch.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        self.temperature.is_some() && self.temperature_set.is_some()
    }
}

/// HVAC operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    Heat,
    Off,
}

impl HvacMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heat => "heat",
            Self::Off => "off",
        }
    }

    /// Whether the heating circuit should be powered in this mode.
    #[must_use]
    pub fn heating_enabled(self) -> bool {
        matches!(self, Self::Heat)
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heat" => Ok(Self::Heat),
            "off" => Ok(Self::Off),
            other => Err(ValidationError::UnsupportedHvacMode(other.to_string())),
        }
    }
}

/// A service call addressed to a climate entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ClimateCommand {
    SetTemperature { temperature: f64 },
    SetHvacMode { hvac_mode: HvacMode },
    SetPresetMode { preset_mode: String },
}

impl ClimateCommand {
    /// Parse a `(service, data)` pair as sent by the hub.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for unknown services or when the
    /// payload lacks the field the service needs.
    pub fn parse(service: &str, data: &serde_json::Value) -> Result<Self, HubError> {
        match service {
            "set_temperature" => {
                let temperature = data
                    .get("temperature")
                    .and_then(serde_json::Value::as_f64)
                    .ok_or(ValidationError::InvalidServiceData("temperature"))?;
                Ok(Self::SetTemperature { temperature })
            }
            "set_hvac_mode" => {
                let hvac_mode = data
                    .get("hvac_mode")
                    .and_then(serde_json::Value::as_str)
                    .ok_or(ValidationError::InvalidServiceData("hvac_mode"))?
                    .parse::<HvacMode>()?;
                Ok(Self::SetHvacMode { hvac_mode })
            }
            "set_preset_mode" => {
                let preset_mode = data
                    .get("preset_mode")
                    .and_then(serde_json::Value::as_str)
                    .ok_or(ValidationError::InvalidServiceData("preset_mode"))?;
                Ok(Self::SetPresetMode {
                    preset_mode: preset_mode.to_string(),
                })
            }
            other => Err(ValidationError::UnsupportedService(other.to_string()).into()),
        }
    }
}
