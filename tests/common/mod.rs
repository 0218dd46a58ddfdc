//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use commerce_client::{
    ClientConfig, Dispatcher, PreparedRequest, RawResponse, Transport, TransportError,
};
use serde_json::Value;

/// Transport that replays scripted responses and records what was sent.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<RawResponse, String>>>,
    seen: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_json(self, status: u16, body: Value) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::json(status, &body)));
        self
    }

    pub fn then_raw(self, response: RawResponse) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn then_fail(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn sent(&self) -> Vec<PreparedRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::new(message)),
            None => Err(TransportError::new("no scripted response")),
        }
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new("https://api.shop.example/v1").unwrap()
}

pub fn dispatcher<S: commerce_client::TokenStore>(
    transport: ScriptedTransport,
    store: S,
) -> Dispatcher<ScriptedTransport, S> {
    Dispatcher::new(config(), transport, store)
}
