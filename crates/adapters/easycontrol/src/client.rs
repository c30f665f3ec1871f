//! EasyControl API client: authenticated requests, retry policy, and the
//! cached device reading.
//!
//! ## Retry policy
//!
//! | Failure | Token | Retry | Delay | After 3 retries |
//! |---------|-------|-------|-------|-----------------|
//! | non-2xx status | invalidated | yes | 1 s | `Ok(None)` |
//! | network error | invalidated | yes | none | `Err` |
//! | timeout | invalidated | yes | none | `Err` |
//!
//! A caller polling the API sees a status failure as "no data" and a
//! transport failure as an error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use thermohub_domain::climate::DeviceState;

use crate::config::EasyControlConfig;
use crate::error::{EasyControlError, TransportError};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

/// Retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;
/// Pause before retrying a non-2xx response.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);
/// Minimum age of the cached reading before a non-forced update refetches.
pub const CACHE_TTL: Duration = Duration::from_secs(30);

/// Validity of the configured access token.
///
/// There is no refresh flow: once invalidated, the token stays so until
/// [`EasyControl::reconfigure_token`] installs a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Valid(String),
    Invalidated,
}

/// `{ "value": <number> }` as returned by the zone resources.
///
/// `value` must be present but may be `null`, which reads as "no data".
#[derive(Debug, Deserialize)]
struct ResourceValue {
    #[serde(deserialize_with = "Option::deserialize")]
    value: Option<f64>,
}

/// Body of `PUT /services/app/Devices/UpdateUserDevice`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserDevice<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    power_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature_set: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_program: Option<&'a str>,
}

/// Client for a single EasyControl gateway.
pub struct EasyControl<T> {
    transport: T,
    base_url: String,
    device_id: String,
    auth_header: String,
    token: TokenState,
    timeout: Duration,
    devices: DeviceState,
    last_updated: Option<Instant>,
}

impl<T: Transport> EasyControl<T> {
    /// Create a client for `config.device_id`, authenticating with
    /// `config.access_token`.
    #[must_use]
    pub fn new(transport: T, config: &EasyControlConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            device_id: config.device_id.clone(),
            auth_header: config.access_token.clone(),
            token: TokenState::Valid(config.access_token.clone()),
            timeout: Duration::from_secs(config.timeout_secs),
            devices: DeviceState::default(),
            last_updated: None,
        }
    }

    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    #[must_use]
    pub fn token(&self) -> &TokenState {
        &self.token
    }

    #[must_use]
    pub fn is_token_valid(&self) -> bool {
        matches!(self.token, TokenState::Valid(_))
    }

    /// Install a new access token, leaving the invalidated state.
    pub fn reconfigure_token(&mut self, access_token: impl Into<String>) {
        let access_token = access_token.into();
        self.auth_header.clone_from(&access_token);
        self.token = TokenState::Valid(access_token);
        tracing::info!(device_id = %self.device_id, "EasyControl access token reconfigured");
    }

    /// Last cached reading, without touching the network.
    #[must_use]
    pub fn cached(&self) -> DeviceState {
        self.devices
    }

    /// When the last update started, if any.
    #[must_use]
    pub fn last_updated(&self) -> Option<Instant> {
        self.last_updated
    }

    /// Refresh the cache if it is stale, then return the current reading.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn get_devices(&mut self) -> Result<DeviceState, EasyControlError> {
        self.update(false).await?;
        Ok(self.devices)
    }

    /// Refetch both readings unless the cache is younger than [`CACHE_TTL`]
    /// and `force` is false.
    ///
    /// The timestamp moves before any network call, so a failed fetch also
    /// holds off the next non-forced one for [`CACHE_TTL`].
    ///
    /// # Errors
    ///
    /// Returns [`EasyControlError::Transport`] when a request exhausted its
    /// retries on network errors or timeouts, and
    /// [`EasyControlError::MalformedBody`] when a response lacks `value`.
    /// The cached reading is left untouched in both cases.
    pub async fn update(&mut self, force: bool) -> Result<(), EasyControlError> {
        let now = Instant::now();
        if !force
            && self
                .last_updated
                .is_some_and(|last| now.duration_since(last) < CACHE_TTL)
        {
            tracing::trace!(device_id = %self.device_id, "EasyControl cache still fresh");
            return Ok(());
        }
        self.last_updated = Some(now);
        self.fetch_user_devices().await
    }

    async fn fetch_user_devices(&mut self) -> Result<(), EasyControlError> {
        let actual_url = self.zone_url("temperatureActual");
        let actual = self.request(&actual_url, Method::Get, None).await?;

        let target_url = self.zone_url("manualTemperatureHeating");
        let target = self.request(&target_url, Method::Get, None).await?;

        self.devices = match (actual, target) {
            (Some(actual), Some(target)) => DeviceState {
                temperature: read_value(&actual_url, &actual)?,
                temperature_set: read_value(&target_url, &target)?,
            },
            _ => DeviceState::unavailable(),
        };
        tracing::debug!(
            device_id = %self.device_id,
            temperature = ?self.devices.temperature,
            temperature_set = ?self.devices.temperature_set,
            "EasyControl readings refreshed"
        );
        Ok(())
    }

    /// Set the target temperature and heating power of `device_id`.
    ///
    /// The cached reading is not touched; call `update(true)` to observe
    /// the effect.
    ///
    /// # Errors
    ///
    /// Returns [`EasyControlError::Transport`] when retries are exhausted on
    /// transport failures.
    pub async fn set_room_target_temperature(
        &mut self,
        device_id: &str,
        temperature: f64,
        heating_enabled: bool,
    ) -> Result<(), EasyControlError> {
        self.update_user_device(UpdateUserDevice {
            id: device_id,
            power_on: Some(heating_enabled),
            temperature_set: Some(temperature),
            selected_program: None,
        })
        .await
    }

    /// Switch the heating of `device_id` on or off.
    ///
    /// # Errors
    ///
    /// Same as [`set_room_target_temperature`](Self::set_room_target_temperature).
    pub async fn set_powerstate(
        &mut self,
        device_id: &str,
        heating_enabled: bool,
    ) -> Result<(), EasyControlError> {
        self.update_user_device(UpdateUserDevice {
            id: device_id,
            power_on: Some(heating_enabled),
            temperature_set: None,
            selected_program: None,
        })
        .await
    }

    /// Select the program (preset) of `device_id`.
    ///
    /// # Errors
    ///
    /// Same as [`set_room_target_temperature`](Self::set_room_target_temperature).
    pub async fn set_preset_mode(
        &mut self,
        device_id: &str,
        preset_mode: &str,
    ) -> Result<(), EasyControlError> {
        self.update_user_device(UpdateUserDevice {
            id: device_id,
            power_on: None,
            temperature_set: None,
            selected_program: Some(preset_mode),
        })
        .await
    }

    async fn update_user_device(
        &mut self,
        payload: UpdateUserDevice<'_>,
    ) -> Result<(), EasyControlError> {
        let body = serde_json::to_value(&payload).map_err(EasyControlError::Encode)?;
        let url = format!("{}/services/app/Devices/UpdateUserDevice", self.base_url);
        if self.request(&url, Method::Put, Some(body)).await?.is_none() {
            tracing::warn!(device_id = payload.id, "EasyControl rejected device update");
        }
        Ok(())
    }

    /// Send one request with the retry policy described in the module docs.
    ///
    /// Returns `Ok(None)` when every attempt got a non-2xx status.
    ///
    /// # Errors
    ///
    /// Returns the last [`TransportError`] when every attempt failed at the
    /// transport level.
    pub async fn request(
        &mut self,
        url: &str,
        method: Method,
        payload: Option<serde_json::Value>,
    ) -> Result<Option<ApiResponse>, TransportError> {
        let mut retries = MAX_RETRIES;
        loop {
            let request = ApiRequest {
                method,
                url: url.to_string(),
                authorization: self.auth_header.clone(),
                body: payload.clone(),
            };
            tracing::debug!(%method, %url, retries, "EasyControl request");

            let outcome = tokio::time::timeout(self.timeout, self.transport.send(request))
                .await
                .unwrap_or(Err(TransportError::Timeout));

            match outcome {
                Ok(response) if response.is_success() => return Ok(Some(response)),
                Ok(response) => {
                    tracing::warn!(%method, %url, status = response.status, retries, "EasyControl request rejected");
                    self.invalidate_token();
                    if retries == 0 {
                        return Ok(None);
                    }
                    retries -= 1;
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => {
                    tracing::warn!(%method, %url, error = %err, retries, "EasyControl request failed");
                    self.invalidate_token();
                    if retries == 0 {
                        return Err(err);
                    }
                    retries -= 1;
                }
            }
        }
    }

    fn invalidate_token(&mut self) {
        if self.is_token_valid() {
            tracing::warn!(device_id = %self.device_id, "EasyControl access token invalidated");
        }
        self.token = TokenState::Invalidated;
    }

    fn zone_url(&self, resource: &str) -> String {
        format!(
            "{}/gateways/{}/resource/zones/zn1/{resource}",
            self.base_url, self.device_id
        )
    }
}

fn read_value(url: &str, response: &ApiResponse) -> Result<Option<f64>, EasyControlError> {
    response
        .json::<ResourceValue>()
        .map(|reading| reading.value)
        .map_err(|source| EasyControlError::MalformedBody {
            url: url.to_string(),
            source,
        })
}
