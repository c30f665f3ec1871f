//! EasyControl integration configuration.

use serde::Deserialize;

/// Vendor API root used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://ews-emea.api.bosch.com/home/sandbox/pointt/v1";

/// Configuration for the EasyControl integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EasyControlConfig {
    /// Access token sent verbatim in the `Authorization` header.
    pub access_token: String,
    /// Gateway identifier of the thermostat.
    pub device_id: String,
    /// Display name of the climate entity.
    pub name: String,
    /// Root of the vendor API.
    pub base_url: String,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    /// Interval between background refreshes, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for EasyControlConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            device_id: String::new(),
            name: "BOSCH_NEW".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            poll_interval_secs: 30,
        }
    }
}
