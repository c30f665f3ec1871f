//! Scripted [`Transport`] for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::TransportError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// What the fake answers to the next request.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Status(u16, String),
    NetworkError,
    /// Never answers; only a timeout gets the caller out.
    Hang,
}

impl Reply {
    pub(crate) fn value(value: f64) -> Self {
        Self::Status(200, format!(r#"{{"value": {value}}}"#))
    }
}

#[derive(Debug, Default)]
struct State {
    script: VecDeque<Reply>,
    requests: Vec<ApiRequest>,
}

/// Replays queued replies in order and records every request.
///
/// When the script runs dry it answers `200` with an empty body.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub(crate) fn push(&self, reply: Reply) -> &Self {
        self.state.lock().unwrap().script.push_back(reply);
        self
    }

    pub(crate) fn push_n(&self, reply: &Reply, times: usize) -> &Self {
        for _ in 0..times {
            self.push(reply.clone());
        }
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            state.script.pop_front()
        };

        match reply {
            Some(Reply::Status(status, body)) => Ok(ApiResponse::new(status, body)),
            Some(Reply::NetworkError) => Err(TransportError::Network(Box::new(
                std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            ))),
            Some(Reply::Hang) => std::future::pending().await,
            None => Ok(ApiResponse::new(200, Vec::new())),
        }
    }
}
