//! Bedrock runtime transport.
//!
//! Posts the adapted payload to `{base_url}/model/{model_id}/invoke` and
//! decodes the body as JSON. Authenticates with a Bedrock API key sent as a
//! bearer token. One request, one response: no streaming, no retries.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;

use crate::inference::{AdapterError, InferenceTransport, RequestPayload, TransportError};

/// Regional Bedrock runtime endpoint.
pub fn default_base_url(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

/// A body that cannot be encoded is a data problem, not a config one.
fn payload_error(e: AdapterError) -> TransportError {
    TransportError::Parse(format!("request body: {e}"))
}

pub struct BedrockTransport {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl BedrockTransport {
    /// Creates a new Bedrock transport.
    ///
    /// # Arguments
    /// * `base_url` - Runtime endpoint, without a trailing slash
    /// * `api_key` - Bedrock API key
    pub fn new(base_url: String, api_key: String) -> Result<Self, TransportError> {
        if api_key.trim().is_empty() {
            return Err(TransportError::Config("missing Bedrock API key".to_string()));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        })
    }

    fn invoke_url(&self, model_id: &str) -> String {
        format!("{}/model/{}/invoke", self.base_url, model_id)
    }
}

#[async_trait]
impl InferenceTransport for BedrockTransport {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn invoke(&self, model_id: &str, payload: &RequestPayload) -> Result<Value, TransportError> {
        let body = payload.to_json().map_err(payload_error)?;

        info!(
            "Bedrock invoke: model={}, provider={}, body_bytes={}",
            model_id,
            payload.provider(),
            body.len()
        );

        let response = self
            .client
            .post(self.invoke_url(model_id))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        debug!("Bedrock response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Bedrock API error: {} - {}", status, err_body);
            return Err(TransportError::Api {
                status,
                message: err_body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Bedrock response was not JSON: {}", e);
            TransportError::Parse(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url_uses_region() {
        assert_eq!(
            default_base_url("us-west-2"),
            "https://bedrock-runtime.us-west-2.amazonaws.com"
        );
    }

    #[test]
    fn test_invoke_url_strips_trailing_slash() {
        let transport = BedrockTransport::new("http://localhost:9000/".into(), "key".into()).unwrap();
        assert_eq!(
            transport.invoke_url("amazon.titan-text-express-v1"),
            "http://localhost:9000/model/amazon.titan-text-express-v1/invoke"
        );
    }

    #[test]
    fn test_payload_encoding_failure_is_parse_error() {
        let err = payload_error(AdapterError::Serialize("key must be a string".into()));
        assert!(matches!(err, TransportError::Parse(ref msg) if msg.contains("key must be a string")));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_blank_api_key_is_config_error() {
        let err = BedrockTransport::new("http://localhost".into(), "  ".into())
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::Config(_)));
    }
}
