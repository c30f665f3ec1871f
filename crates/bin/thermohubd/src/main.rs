//! # thermohubd: thermohub daemon
//!
//! Composition root that wires the EasyControl integration to the registry
//! and keeps it running.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise logging
//! - Build the shared HTTP client and the integration
//! - Run the integration lifecycle until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use anyhow::Context;
use thermohub_adapter_easycontrol::{EasyControlIntegration, ReqwestTransport};
use thermohub_app::ports::integration::Integration;
use thermohub_app::registry::Registry;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;

    let registry = Registry::default();
    let mut integration = EasyControlIntegration::new(&config.easycontrol, ReqwestTransport::new(http));

    integration
        .setup(&registry)
        .await
        .context("EasyControl setup failed")?;
    integration.start_background(registry.clone()).await?;

    tracing::info!(
        integration = integration.name(),
        entities = registry.entities().await.len(),
        "thermohubd running"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("shutting down");
    integration.teardown().await?;
    Ok(())
}
