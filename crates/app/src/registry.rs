//! In-memory device/entity registry: the hub-side [`IntegrationContext`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use thermohub_domain::device::Device;
use thermohub_domain::entity::Entity;
use thermohub_domain::error::HubError;
use thermohub_domain::id::{DeviceId, EntityId};
use thermohub_domain::time::now;

use crate::ports::IntegrationContext;

#[derive(Debug, Default)]
struct Inner {
    devices: HashMap<DeviceId, Device>,
    entities: HashMap<EntityId, Entity>,
}

/// Registry of every device and entity the integrations reported.
///
/// Cheaply cloneable; clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<Inner>>,
}

impl Registry {
    /// List all registered devices.
    pub async fn devices(&self) -> Vec<Device> {
        self.inner.read().await.devices.values().cloned().collect()
    }

    /// List all registered entities.
    pub async fn entities(&self) -> Vec<Entity> {
        self.inner.read().await.entities.values().cloned().collect()
    }

    /// Look up an entity by its `domain.object_id` string.
    pub async fn find_entity(&self, entity_id: &str) -> Option<Entity> {
        self.inner
            .read()
            .await
            .entities
            .values()
            .find(|ent| ent.entity_id == entity_id)
            .cloned()
    }
}

impl IntegrationContext for Registry {
    /// Create or update a device by its `(integration, unique_id)` pair,
    /// preserving the id of an already registered device.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    async fn upsert_device(&self, device: Device) -> Result<Device, HubError> {
        device.validate()?;
        let mut inner = self.inner.write().await;
        let existing = inner
            .devices
            .values()
            .find(|dev| dev.integration == device.integration && dev.unique_id == device.unique_id)
            .map(|dev| dev.id);

        let stored = Device {
            id: existing.unwrap_or(device.id),
            ..device
        };
        if existing.is_none() {
            tracing::info!(device_id = %stored.id, integration = %stored.integration, "device registered");
        }
        inner.devices.insert(stored.id, stored.clone());
        Ok(stored)
    }

    /// Create or update an entity by its `entity_id` string.
    ///
    /// An existing entity keeps its id; its state goes through
    /// [`Entity::update_state`] so `last_changed` only moves on real changes.
    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    async fn upsert_entity(&self, entity: Entity) -> Result<Entity, HubError> {
        entity.validate()?;
        let ts = now();
        let mut inner = self.inner.write().await;
        let existing = inner
            .entities
            .values()
            .find(|ent| ent.entity_id == entity.entity_id)
            .cloned();

        let stored = match existing {
            Some(mut current) => {
                let previous = current.state;
                current.device_id = entity.device_id;
                current.friendly_name = entity.friendly_name;
                current.attributes = entity.attributes;
                current.update_state(entity.state, ts);
                if previous != current.state {
                    tracing::info!(from = %previous, to = %current.state, "entity state changed");
                }
                current
            }
            None => {
                tracing::info!(state = %entity.state, "entity registered");
                Entity {
                    last_changed: ts,
                    last_updated: ts,
                    ..entity
                }
            }
        };
        inner.entities.insert(stored.id, stored.clone());
        Ok(stored)
    }
}
