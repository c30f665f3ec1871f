//! Transport port: the single network call the client is built on.
//!
//! [`EasyControl`](crate::client::EasyControl) owns retries, timeouts, and
//! token bookkeeping; a [`Transport`] only performs one request and reports
//! what happened.

use std::fmt;
use std::future::Future;

use serde::de::DeserializeOwned;

use crate::error::TransportError;

/// HTTP verbs used against the vendor API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Put => f.write_str("PUT"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A fully-prepared request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Value of the `Authorization` header, sent verbatim.
    pub authorization: String,
    /// JSON body, attached whatever the method.
    pub body: Option<serde_json::Value>,
}

/// A received response with its body fully read.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoding error when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Performs a single HTTP exchange.
pub trait Transport: Send + Sync {
    /// Send `request` and return the response, whatever its status.
    ///
    /// Only connection-level failures are errors; a 4xx/5xx is a response.
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

/// [`Transport`] backed by a (typically host-shared) [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        let builder = builder.header(reqwest::header::AUTHORIZATION, &request.authorization);
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
