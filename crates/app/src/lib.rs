//! # thermohub-app
//!
//! Application layer: **port definitions** (traits) and in-process
//! infrastructure.
//!
//! ## Responsibilities
//! - Define the `Integration` port that device integrations implement
//! - Define the `IntegrationContext` port integrations use to persist what
//!   they discover
//! - Provide an in-memory [`registry::Registry`] implementing
//!   `IntegrationContext`
//!
//! ## Dependency rule
//! Depends on `thermohub-domain` only (plus `tokio::sync`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod registry;
