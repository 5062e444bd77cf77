use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::adapter::RequestPayload;
use crate::Provider;

/// Errors raised while shaping a request or reading a response.
/// None of these are retryable: the input itself is wrong.
#[derive(Debug)]
pub enum AdapterError {
    /// Provider id missing from the model catalog.
    UnknownProvider(String),
    /// Provider id has no request/response shape.
    UnsupportedProvider(String),
    /// Response did not have the provider's answer path.
    MalformedResponse { provider: Provider, message: String },
    /// Payload could not be serialized.
    Serialize(String),
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::UnknownProvider(id) => write!(f, "unknown model provider: {id}"),
            AdapterError::UnsupportedProvider(id) => {
                write!(f, "unsupported model provider: {id}")
            }
            AdapterError::MalformedResponse { provider, message } => {
                write!(f, "malformed {provider} response: {message}")
            }
            AdapterError::Serialize(msg) => write!(f, "payload serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for AdapterError {}

/// Errors that can occur while talking to the inference service.
/// Variants carry enough info for a caller to decide on retries.
#[derive(Debug)]
pub enum TransportError {
    /// Transport misconfigured (missing API key, bad URL). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused). Retryable.
    Network(String),
    /// Service returned an error response. Retryable if status >= 500 or 429.
    Api { status: u16, message: String },
    /// Response body was not JSON. Not retryable.
    Parse(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) => true,
            TransportError::Api { status, .. } => *status >= 500 || *status == 429,
            TransportError::Config(_) | TransportError::Parse(_) => false,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Config(msg) => write!(f, "config error: {msg}"),
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            TransportError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Delivers a shaped payload to a model and hands back the decoded response.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    /// Returns the name of the transport.
    fn name(&self) -> &str;

    /// Invokes `model_id` once with `payload`. No retries.
    async fn invoke(&self, model_id: &str, payload: &RequestPayload) -> Result<Value, TransportError>;
}
