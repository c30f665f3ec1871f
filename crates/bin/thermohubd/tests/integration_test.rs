//! End-to-end tests for the thermohub stack.
//!
//! Each test wires the real registry and the real EasyControl integration
//! to a scripted transport standing in for the vendor API. No socket is
//! opened. Time is paused so retry delays and polling run instantly.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thermohub_adapter_easycontrol::{
    ApiRequest, ApiResponse, EasyControlConfig, EasyControlIntegration, Method, Transport,
    TransportError,
};
use thermohub_app::ports::integration::Integration;
use thermohub_app::registry::Registry;
use thermohub_domain::entity::{AttributeValue, EntityState};
use thermohub_domain::error::HubError;

/// Vendor API double: answers from a queue of `(status, body)` pairs.
#[derive(Clone, Default)]
struct ScriptedApi {
    replies: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedApi {
    fn reply(&self, status: u16, body: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
        self
    }

    fn reading(&self, value: f64) -> &Self {
        self.reply(200, &format!(r#"{{"value": {value}}}"#))
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let (status, body) = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((500, String::new()));
        Ok(ApiResponse::new(status, body))
    }
}

fn config() -> EasyControlConfig {
    EasyControlConfig {
        access_token: "secret-token".to_string(),
        device_id: "101506113".to_string(),
        name: "Living Room".to_string(),
        base_url: "https://vendor.test/pointt/v1".to_string(),
        ..EasyControlConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_register_thermostat_and_keep_it_fresh() {
    let api = ScriptedApi::default();
    api.reading(20.5).reading(21.0).reading(19.5).reading(21.0);
    let registry = Registry::default();
    let mut integration = EasyControlIntegration::new(&config(), api.clone());

    integration.setup(&registry).await.unwrap();
    integration.start_background(registry.clone()).await.unwrap();

    let entity = registry.find_entity("climate.living_room").await.unwrap();
    assert_eq!(entity.state, EntityState::On);
    assert_eq!(
        entity.get_attribute("current_temperature"),
        Some(&AttributeValue::Float(20.5))
    );

    tokio::time::sleep(Duration::from_secs(35)).await;

    let entity = registry.find_entity("climate.living_room").await.unwrap();
    assert_eq!(
        entity.get_attribute("current_temperature"),
        Some(&AttributeValue::Float(19.5))
    );
    assert_eq!(registry.entities().await.len(), 1);
    assert_eq!(registry.devices().await.len(), 1);

    integration.teardown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn should_mark_thermostat_unavailable_when_api_keeps_failing() {
    let api = ScriptedApi::default();
    let registry = Registry::default();
    let mut integration = EasyControlIntegration::new(&config(), api.clone());

    integration.setup(&registry).await.unwrap();

    let entity = registry.find_entity("climate.living_room").await.unwrap();
    assert_eq!(entity.state, EntityState::Unavailable);
    // Two readings, four attempts each.
    assert_eq!(api.requests().len(), 8);
}

// ---------------------------------------------------------------------------
// Service calls
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_write_setpoint_and_report_new_target() {
    let api = ScriptedApi::default();
    api.reading(20.5).reading(21.0);
    let registry = Registry::default();
    let mut integration = EasyControlIntegration::new(&config(), api.clone());
    integration.setup(&registry).await.unwrap();
    let entity = registry.find_entity("climate.living_room").await.unwrap();

    api.reply(200, "").reading(20.5).reading(23.0);
    let updated = integration
        .handle_service_call(
            entity.id,
            "set_temperature",
            serde_json::json!({"temperature": 23.0}),
        )
        .await
        .unwrap();

    assert_eq!(
        updated.get_attribute("temperature"),
        Some(&AttributeValue::Float(23.0))
    );
    let put = &api.requests()[2];
    assert_eq!(put.method, Method::Put);
    assert_eq!(
        put.url,
        "https://vendor.test/pointt/v1/services/app/Devices/UpdateUserDevice"
    );
    assert_eq!(put.authorization, "secret-token");
    assert_eq!(
        put.body,
        Some(serde_json::json!({"id": "101506113", "powerOn": true, "temperatureSet": 23.0}))
    );
}

#[tokio::test(start_paused = true)]
async fn should_reject_unsupported_hvac_mode() {
    let api = ScriptedApi::default();
    api.reading(20.5).reading(21.0);
    let registry = Registry::default();
    let mut integration = EasyControlIntegration::new(&config(), api.clone());
    integration.setup(&registry).await.unwrap();
    let entity = registry.find_entity("climate.living_room").await.unwrap();

    let result = integration
        .handle_service_call(
            entity.id,
            "set_hvac_mode",
            serde_json::json!({"hvac_mode": "cool"}),
        )
        .await;

    assert!(matches!(result, Err(HubError::Validation(_))));
    assert_eq!(api.requests().len(), 2);
}
