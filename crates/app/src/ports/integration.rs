//! Integration port: lifecycle and service-call handling for device integrations.
//!
//! An integration bridges an external system (a vendor cloud API, a local
//! protocol, …) into thermohub. It discovers devices/entities on startup,
//! keeps their state fresh, and handles service calls directed at entities
//! it owns.

use std::future::Future;

use thermohub_domain::device::Device;
use thermohub_domain::entity::Entity;
use thermohub_domain::error::HubError;
use thermohub_domain::id::EntityId;

/// Context provided to integrations for persisting discoveries and
/// state refreshes.
///
/// This is a **port**: adapters call it to persist devices and entities.
/// The hub provides a concrete implementation
/// ([`Registry`](crate::registry::Registry)).
pub trait IntegrationContext: Send + Sync {
    /// Persist a discovered device (create or update by `integration`+`unique_id`).
    fn upsert_device(&self, device: Device)
    -> impl Future<Output = Result<Device, HubError>> + Send;

    /// Persist an entity snapshot (create or update by `entity_id` string).
    fn upsert_entity(&self, entity: Entity)
    -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Convenience: persist a full [`DiscoveredDevice`] (device + all entities).
    fn persist_discovered(
        &self,
        dd: DiscoveredDevice,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        async move {
            self.upsert_device(dd.device).await?;
            for entity in dd.entities {
                self.upsert_entity(entity).await?;
            }
            Ok(())
        }
    }
}

/// A pluggable device integration.
///
/// The hub calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): initialise and persist the first snapshot
/// 2. [`start_background`](Self::start_background): spawn polling tasks
/// 3. (the hub runs, forwarding service calls via [`handle_service_call`](Self::handle_service_call))
/// 4. [`teardown`](Self::teardown): clean up resources
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"easycontrol"`).
    fn name(&self) -> &'static str;

    /// Initialise and persist the devices/entities known right away.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Start long-running background work (polling).
    ///
    /// Spawns internal tasks that persist refreshed entities via `ctx` and
    /// returns immediately. The default implementation is a no-op.
    fn start_background(
        &mut self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        async { Ok(()) }
    }

    /// Handle a service call (e.g. `set_temperature`) for an entity owned
    /// by this integration.
    ///
    /// Returns the new [`Entity`] state after handling the call.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Called on graceful shutdown. Clean up any background tasks or connections.
    fn teardown(&mut self) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// A device and its associated entities discovered by an integration.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
