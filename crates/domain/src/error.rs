//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HubError`]
//! via `#[from]` (or an explicit `into_domain`) at port boundaries.

/// Base error type crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// Failure inside an integration (network, protocol, …).
    #[error("integration error")]
    Integration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity id `{0}` must follow the `domain.object_id` format")]
    InvalidEntityId(String),

    #[error("unsupported service `{0}`")]
    UnsupportedService(String),

    #[error("missing or invalid field `{0}` in service data")]
    InvalidServiceData(&'static str),

    #[error("unsupported hvac mode `{0}`")]
    UnsupportedHvacMode(String),

    #[error("temperature {value} outside of [{min}, {max}]")]
    TemperatureOutOfRange { value: f64, min: f64, max: f64 },
}

/// A lookup did not match any known record.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of record that was looked up (e.g. `"Entity"`).
    pub entity: &'static str,
    pub id: String,
}
