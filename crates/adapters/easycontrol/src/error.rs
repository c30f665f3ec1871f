//! EasyControl adapter error types.

use thermohub_domain::error::HubError;

/// Failure of a single network call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No response within the per-request timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (DNS, TLS, refused, reset, …).
    #[error("network error")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(Box::new(err))
        }
    }
}

/// Errors specific to the EasyControl adapter.
#[derive(Debug, thiserror::Error)]
pub enum EasyControlError {
    /// Retries exhausted on a transport failure.
    #[error("EasyControl API unreachable")]
    Transport(#[from] TransportError),

    /// A successful response did not carry the expected JSON.
    #[error("malformed response from {url}")]
    MalformedBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request payload could not be encoded.
    #[error("failed to encode request payload")]
    Encode(#[source] serde_json::Error),
}

impl EasyControlError {
    /// Convert into a [`HubError`] for propagation across port boundaries.
    #[must_use]
    pub fn into_domain(self) -> HubError {
        HubError::Integration(Box::new(self))
    }
}

impl From<EasyControlError> for HubError {
    fn from(err: EasyControlError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_timeout_error() {
        let err = EasyControlError::Transport(TransportError::Timeout);
        assert_eq!(err.to_string(), "EasyControl API unreachable");
    }

    #[test]
    fn should_display_malformed_body_with_url() {
        let source = serde_json::from_str::<serde_json::Value>("{{").unwrap_err();
        let err = EasyControlError::MalformedBody {
            url: "https://api/x".to_string(),
            source,
        };
        assert_eq!(err.to_string(), "malformed response from https://api/x");
    }

    #[test]
    fn should_convert_transport_error_to_integration_error() {
        let err: HubError = EasyControlError::Transport(TransportError::Timeout).into();
        assert!(matches!(err, HubError::Integration(_)));
    }
}
