//! Entity: the central state-holding concept.
//!
//! An entity represents a single observable/controllable aspect of a device
//! (here: a thermostat zone with its current and target temperature).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, ValidationError};
use crate::id::{DeviceId, EntityId};
use crate::time::{Timestamp, now};

/// Discrete operational state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    On,
    Off,
    #[default]
    Unknown,
    Unavailable,
}

impl EntityState {
    /// Whether the entity is reachable (anything but [`Unavailable`](Self::Unavailable)).
    #[must_use]
    pub fn is_available(self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unknown => f.write_str("unknown"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// A state holder exposed to the rest of the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub device_id: DeviceId,
    /// Human-readable `domain.object_id` identifier (e.g. `climate.living_room`).
    pub entity_id: String,
    pub friendly_name: String,
    pub state: EntityState,
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] when `friendly_name` is empty or
    /// `entity_id` is not of the form `domain.object_id`.
    pub fn validate(&self) -> Result<(), HubError> {
        if self.friendly_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let well_formed = self
            .entity_id
            .split_once('.')
            .is_some_and(|(domain, object)| !domain.is_empty() && !object.is_empty());
        if !well_formed {
            return Err(ValidationError::InvalidEntityId(self.entity_id.clone()).into());
        }
        Ok(())
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Record a new state observed at `at`.
    ///
    /// `last_changed` only moves when the state actually differs;
    /// `last_updated` always moves.
    pub fn update_state(&mut self, state: EntityState, at: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = at;
        }
        self.last_updated = at;
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    device_id: Option<DeviceId>,
    entity_id: Option<String>,
    friendly_name: Option<String>,
    state: EntityState,
    attributes: HashMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set an attribute only when a value is present.
    #[must_use]
    pub fn maybe_attribute(self, key: impl Into<String>, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.attribute(key, value),
            None => self,
        }
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the name is empty or the
    /// `entity_id` is malformed.
    pub fn build(self) -> Result<Entity, HubError> {
        let ts = now();
        let entity = Entity {
            id: self.id.unwrap_or_default(),
            device_id: self.device_id.unwrap_or_default(),
            entity_id: self.entity_id.unwrap_or_default(),
            friendly_name: self.friendly_name.unwrap_or_default(),
            state: self.state,
            attributes: self.attributes,
            last_changed: ts,
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn thermostat() -> Entity {
        Entity::builder()
            .entity_id("climate.bosch_new")
            .friendly_name("BOSCH_NEW")
            .state(EntityState::On)
            .attribute("current_temperature", 20.5)
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_entity_with_attributes() {
        let entity = thermostat();
        assert_eq!(entity.entity_id, "climate.bosch_new");
        assert_eq!(
            entity.get_attribute("current_temperature"),
            Some(&AttributeValue::Float(20.5))
        );
        assert_eq!(entity.last_changed, entity.last_updated);
    }

    #[test]
    fn should_reject_empty_friendly_name() {
        let result = Entity::builder().entity_id("climate.x").build();
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_reject_entity_id_without_domain() {
        let result = Entity::builder()
            .entity_id("bosch_new")
            .friendly_name("BOSCH_NEW")
            .build();
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::InvalidEntityId(_)))
        ));
    }

    #[test]
    fn should_skip_absent_optional_attribute() {
        let entity = Entity::builder()
            .entity_id("climate.x")
            .friendly_name("x")
            .maybe_attribute("temperature", None)
            .build()
            .unwrap();
        assert!(entity.get_attribute("temperature").is_none());
    }

    #[test]
    fn should_move_last_changed_only_when_state_differs() {
        let mut entity = thermostat();
        let first = entity.last_changed;

        let later = first + Duration::seconds(30);
        entity.update_state(EntityState::On, later);
        assert_eq!(entity.last_changed, first);
        assert_eq!(entity.last_updated, later);

        let even_later = later + Duration::seconds(30);
        entity.update_state(EntityState::Unavailable, even_later);
        assert_eq!(entity.last_changed, even_later);
        assert_eq!(entity.state, EntityState::Unavailable);
    }

    #[test]
    fn should_report_unavailable_only_for_unavailable_state() {
        assert!(EntityState::Unknown.is_available());
        assert!(!EntityState::Unavailable.is_available());
        assert_eq!(EntityState::Unavailable.to_string(), "unavailable");
    }

    #[test]
    fn should_serialize_float_attribute_as_plain_number() {
        let json = serde_json::to_string(&AttributeValue::Float(21.5)).unwrap();
        assert_eq!(json, "21.5");
    }
}
