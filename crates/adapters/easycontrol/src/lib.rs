//! # thermohub-adapter-easycontrol
//!
//! Bosch EasyControl integration: polls the vendor cloud API for one
//! thermostat and exposes it as a climate entity.
//!
//! ## How it works
//!
//! [`EasyControl`] performs authenticated calls against the `pointt` API,
//! caches the last reading for 30 seconds and applies the retry policy.
//! [`EasyControlIntegration`] wraps it behind the hub's `Integration` port:
//! it registers the thermostat on setup, refreshes it from a background
//! task, and turns service calls into API writes.
//!
//! ## Supported services
//!
//! | Service | Data | API call |
//! |---------|------|----------|
//! | `set_temperature` | `{"temperature": 21.5}` | `UpdateUserDevice {id, powerOn: true, temperatureSet}` |
//! | `set_hvac_mode` | `{"hvac_mode": "heat" \| "off"}` | `UpdateUserDevice {id, powerOn}` |
//! | `set_preset_mode` | `{"preset_mode": "Manual"}` | `UpdateUserDevice {id, selectedProgram}` |
//!
//! Every write is followed by a forced refresh.
//!
//! ## Dependency rule
//!
//! Depends on `thermohub-app` and `thermohub-domain` only. The host owns the
//! `reqwest::Client` and hands it in through [`ReqwestTransport`].

pub mod climate;
pub mod client;
mod config;
mod error;
#[cfg(test)]
mod testing;
pub mod transport;

pub use client::{EasyControl, TokenState};
pub use config::{DEFAULT_BASE_URL, EasyControlConfig};
pub use error::{EasyControlError, TransportError};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use thermohub_app::ports::integration::{DiscoveredDevice, Integration, IntegrationContext};
use thermohub_domain::climate::ClimateCommand;
use thermohub_domain::entity::Entity;
use thermohub_domain::error::{HubError, NotFoundError};
use thermohub_domain::id::EntityId;

use climate::ClimateEntity;

pub(crate) const INTEGRATION_NAME: &str = "easycontrol";

/// Integration exposing one EasyControl thermostat.
pub struct EasyControlIntegration<T = ReqwestTransport> {
    client: Arc<Mutex<EasyControl<T>>>,
    climate: ClimateEntity,
    poll_interval: Duration,
    poll_handle: Option<JoinHandle<()>>,
}

impl<T: Transport + 'static> EasyControlIntegration<T> {
    #[must_use]
    pub fn new(config: &EasyControlConfig, transport: T) -> Self {
        Self {
            client: Arc::new(Mutex::new(EasyControl::new(transport, config))),
            climate: ClimateEntity::new(&config.name, &config.device_id),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            poll_handle: None,
        }
    }

    /// Check whether this integration owns the given entity.
    #[must_use]
    pub fn owns_entity(&self, entity_id: EntityId) -> bool {
        self.climate.entity_id() == entity_id
    }

    /// Install a new access token on the client.
    pub async fn reconfigure_token(&self, access_token: impl Into<String>) {
        self.client.lock().await.reconfigure_token(access_token);
    }

    async fn apply(&self, command: ClimateCommand) -> Result<Entity, HubError> {
        let mut client = self.client.lock().await;
        let gateway = client.device_id().to_string();

        match command {
            ClimateCommand::SetTemperature { temperature } => {
                climate::check_target(temperature)?;
                client
                    .set_room_target_temperature(&gateway, temperature, true)
                    .await?;
            }
            ClimateCommand::SetHvacMode { hvac_mode } => {
                client
                    .set_powerstate(&gateway, hvac_mode.heating_enabled())
                    .await?;
            }
            ClimateCommand::SetPresetMode { preset_mode } => {
                client.set_preset_mode(&gateway, &preset_mode).await?;
            }
        }
        client.update(true).await?;

        self.climate
            .snapshot(client.cached(), client.is_token_valid())
    }
}

impl<T: Transport + 'static> Integration for EasyControlIntegration<T> {
    fn name(&self) -> &'static str {
        INTEGRATION_NAME
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), HubError> {
        let entity = {
            let mut client = self.client.lock().await;
            let state = client.get_devices().await?;
            self.climate.snapshot(state, client.is_token_valid())?
        };

        tracing::info!(
            entity_id = %entity.entity_id,
            state = %entity.state,
            "EasyControl thermostat discovered"
        );
        if !entity.state.is_available() {
            tracing::warn!(
                entity_id = %entity.entity_id,
                "EasyControl thermostat registered without readings"
            );
        }

        ctx.persist_discovered(DiscoveredDevice {
            device: self.climate.device()?,
            entities: vec![entity],
        })
        .await
    }

    async fn start_background(
        &mut self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), HubError> {
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&self.client),
            self.climate.clone(),
            self.poll_interval,
            ctx,
        ));
        self.poll_handle = Some(handle);

        tracing::info!(
            interval_secs = self.poll_interval.as_secs(),
            "EasyControl polling started"
        );
        Ok(())
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, HubError> {
        if !self.owns_entity(entity_id) {
            return Err(NotFoundError {
                entity: "Entity",
                id: entity_id.to_string(),
            }
            .into());
        }

        let command = ClimateCommand::parse(service, &data)?;
        tracing::debug!(?command, "EasyControl service call");
        self.apply(command).await
    }

    async fn teardown(&mut self) -> Result<(), HubError> {
        if let Some(handle) = self.poll_handle.take() {
            handle.abort();
            tracing::debug!("EasyControl polling task aborted");
        }
        tracing::info!("EasyControl integration stopped");
        Ok(())
    }
}

/// Refresh the thermostat every `interval` and push the snapshot to `ctx`.
async fn poll_loop<T, C>(
    client: Arc<Mutex<EasyControl<T>>>,
    climate: ClimateEntity,
    interval: Duration,
    ctx: C,
) where
    T: Transport,
    C: IntegrationContext,
{
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately and setup() just fetched.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let snapshot = {
            let mut client = client.lock().await;
            match client.get_devices().await {
                Ok(state) => climate.snapshot(state, client.is_token_valid()),
                Err(err) => {
                    tracing::warn!(error = %err, "EasyControl refresh failed");
                    continue;
                }
            }
        };

        let result = match snapshot {
            Ok(entity) => {
                if !entity.state.is_available() {
                    tracing::debug!(entity_id = %entity.entity_id, "EasyControl readings unavailable");
                }
                ctx.upsert_entity(entity).await.map(|_| ())
            }
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist EasyControl entity");
        }
    }
}
