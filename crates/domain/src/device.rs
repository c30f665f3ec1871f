//! Device: a physical thing that exposes one or more entities.

use serde::{Deserialize, Serialize};

use crate::error::{HubError, ValidationError};
use crate::id::DeviceId;

/// A physical device registered by an integration.
///
/// Devices are matched across restarts by their `(integration, unique_id)`
/// pair, never by [`DeviceId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    /// Name of the integration that discovered this device.
    pub integration: String,
    /// Identifier of the device on the integration side (serial, gateway id, …).
    pub unique_id: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
}

impl Device {
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), HubError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    integration: Option<String>,
    unique_id: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn integration(mut self, integration: impl Into<String>) -> Self {
        self.integration = Some(integration.into());
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Device, HubError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            integration: self.integration.unwrap_or_default(),
            unique_id: self.unique_id.unwrap_or_default(),
            manufacturer: self.manufacturer,
            model: self.model,
        };
        device.validate()?;
        Ok(device)
    }
}
