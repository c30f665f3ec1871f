//! Climate entity: maps the cached thermostat reading onto a hub entity.
//!
//! Everything except `current_temperature` and `temperature` is static and
//! never consults the API.

use thermohub_domain::climate::{DeviceState, HvacMode, PRESET_MANUAL};
use thermohub_domain::device::Device;
use thermohub_domain::entity::{AttributeValue, Entity, EntityState};
use thermohub_domain::error::{HubError, ValidationError};
use thermohub_domain::id::{DeviceId, EntityId};

pub const MIN_TEMP: f64 = 5.0;
pub const MAX_TEMP: f64 = 35.0;
pub const TARGET_TEMP_STEP: f64 = 0.5;
pub const TEMPERATURE_UNIT: &str = "\u{b0}C";
const ICON: &str = "mdi:radiator";

/// The climate entity of one EasyControl thermostat.
///
/// Holds fixed ids so snapshots remain the same entity across refreshes.
#[derive(Debug, Clone)]
pub struct ClimateEntity {
    device_id: DeviceId,
    entity_id: EntityId,
    object_id: String,
    name: String,
    gateway_id: String,
}

impl ClimateEntity {
    #[must_use]
    pub fn new(name: impl Into<String>, gateway_id: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            device_id: DeviceId::new(),
            entity_id: EntityId::new(),
            object_id: format!("climate.{}", slugify(&name)),
            name,
            gateway_id: gateway_id.into(),
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// The `climate.*` identifier of the entity.
    #[must_use]
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Device descriptor for registration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured name is empty.
    pub fn device(&self) -> Result<Device, HubError> {
        Device::builder()
            .id(self.device_id)
            .name(&self.name)
            .integration(crate::INTEGRATION_NAME)
            .unique_id(&self.gateway_id)
            .manufacturer("Bosch")
            .model("EasyControl")
            .build()
    }

    /// Build the entity snapshot for `state`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured name is empty.
    pub fn snapshot(&self, state: DeviceState, token_valid: bool) -> Result<Entity, HubError> {
        let entity_state = if state.is_known() {
            EntityState::On
        } else {
            EntityState::Unavailable
        };

        Entity::builder()
            .id(self.entity_id)
            .device_id(self.device_id)
            .entity_id(&self.object_id)
            .friendly_name(&self.name)
            .state(entity_state)
            .maybe_attribute("current_temperature", state.temperature)
            .maybe_attribute("temperature", state.temperature_set)
            .attribute("min_temp", MIN_TEMP)
            .attribute("max_temp", MAX_TEMP)
            .attribute("target_temp_step", TARGET_TEMP_STEP)
            .attribute("temperature_unit", TEMPERATURE_UNIT)
            .attribute("hvac_mode", HvacMode::Heat.as_str())
            .attribute("hvac_action", HvacMode::Heat.as_str())
            .attribute(
                "hvac_modes",
                AttributeValue::Json(serde_json::json!([HvacMode::Heat.as_str()])),
            )
            .attribute("preset_mode", PRESET_MANUAL)
            .attribute(
                "preset_modes",
                AttributeValue::Json(serde_json::json!([PRESET_MANUAL])),
            )
            .attribute("icon", ICON)
            .attribute("token_invalidated", !token_valid)
            .build()
    }
}

/// Reject setpoints the thermostat does not accept.
///
/// # Errors
///
/// Returns [`ValidationError::TemperatureOutOfRange`] outside
/// [`MIN_TEMP`]..=[`MAX_TEMP`].
pub fn check_target(temperature: f64) -> Result<(), ValidationError> {
    if (MIN_TEMP..=MAX_TEMP).contains(&temperature) {
        Ok(())
    } else {
        Err(ValidationError::TemperatureOutOfRange {
            value: temperature,
            min: MIN_TEMP,
            max: MAX_TEMP,
        })
    }
}

/// Lowercase ASCII alphanumerics joined by single underscores.
///
/// Falls back to the integration name when nothing alphanumeric is left.
fn slugify(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if slug.is_empty() {
        crate::INTEGRATION_NAME.to_string()
    } else {
        slug
    }
}
