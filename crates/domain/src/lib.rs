//! # thermohub-domain
//!
//! Pure domain model for the thermohub climate hub.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (state holders with identity, e.g. a thermostat)
//! - Define **Devices** (physical things that expose one or more entities)
//! - Define the **climate** value objects: device readings, HVAC modes and
//!   the commands a climate entity accepts
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod climate;
pub mod device;
pub mod entity;
