//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::inference::{
    ChatRequest, InferenceTransport, Message, RequestPayload, Role, TransportError,
};

/// A transport that answers every call with a canned response and records
/// what it was asked to send.
pub struct RecordingTransport {
    response: Value,
    calls: Mutex<Vec<(String, RequestPayload)>>,
}

impl RecordingTransport {
    pub fn new(response: Value) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, RequestPayload)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn invoke(&self, model_id: &str, payload: &RequestPayload) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((model_id.to_string(), payload.clone()));
        Ok(self.response.clone())
    }
}

/// A single-question chat request.
pub fn user_request(model: &str, question: &str, document_id: Option<&str>) -> ChatRequest {
    ChatRequest {
        messages: vec![Message::new(Role::User, question)],
        model: model.to_string(),
        document_id: document_id.map(str::to_string),
    }
}
