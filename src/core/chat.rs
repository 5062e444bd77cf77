//! # Chat Service
//!
//! One chat round trip:
//!
//! ```text
//! ChatRequest
//!   → fetch grounding document (if document_id)
//!   → build_request(model, turns, document)
//!   → transport.invoke(model_id, payload)
//!   → extract_answer_text(model, response)
//!   → assistant Message
//! ```
//!
//! Errors from the store and transport are passed through as-is.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc::Sender;

use crate::inference::{
    AdapterError, ChatRequest, InferenceTransport, Message, ModelCatalog, Role, StreamChunk,
    TransportError, build_request, extract_answer_text,
};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug)]
pub enum ChatError {
    Adapter(AdapterError),
    Transport(TransportError),
    Store(StoreError),
    /// The request named a document the store does not have.
    DocumentNotFound(String),
    /// The stream receiver was dropped.
    ChannelClosed,
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Adapter(e) => write!(f, "{e}"),
            ChatError::Transport(e) => write!(f, "{e}"),
            ChatError::Store(e) => write!(f, "{e}"),
            ChatError::DocumentNotFound(id) => write!(f, "document not found: {id}"),
            ChatError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Adapter(e) => Some(e),
            ChatError::Transport(e) => Some(e),
            ChatError::Store(e) => Some(e),
            ChatError::DocumentNotFound(_) | ChatError::ChannelClosed => None,
        }
    }
}

impl From<AdapterError> for ChatError {
    fn from(e: AdapterError) -> Self {
        ChatError::Adapter(e)
    }
}

impl From<TransportError> for ChatError {
    fn from(e: TransportError) -> Self {
        ChatError::Transport(e)
    }
}

impl From<StoreError> for ChatError {
    fn from(e: StoreError) -> Self {
        ChatError::Store(e)
    }
}

pub struct ChatService {
    catalog: Arc<ModelCatalog>,
    transport: Arc<dyn InferenceTransport>,
    store: Arc<dyn DocumentStore>,
}

impl ChatService {
    pub fn new(
        catalog: Arc<ModelCatalog>,
        transport: Arc<dyn InferenceTransport>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            catalog,
            transport,
            store,
        }
    }

    /// Runs one request/response cycle and returns the assistant's reply.
    pub async fn respond(&self, request: &ChatRequest) -> Result<Message, ChatError> {
        let document = match request.document_id.as_deref() {
            Some(id) => {
                let doc = self
                    .store
                    .get(id)
                    .await?
                    .ok_or_else(|| ChatError::DocumentNotFound(id.to_string()))?;
                debug!("Grounding on document {} ({} bytes)", doc.id, doc.size);
                Some(doc.content)
            }
            None => None,
        };

        let turns = request.turns();
        let adapted = build_request(&self.catalog, &request.model, &turns, document.as_deref())?;

        info!(
            "Chat request: model={}, transport={}, turns={}",
            request.model,
            self.transport.name(),
            turns.len()
        );

        let response = self
            .transport
            .invoke(&adapted.model_id, &adapted.payload)
            .await
            .inspect_err(|e| {
                warn!(
                    "{} invoke failed (retryable={}): {}",
                    self.transport.name(),
                    e.is_retryable(),
                    e
                );
            })?;
        let answer = extract_answer_text(&request.model, &response).inspect_err(|e| {
            warn!("Could not read {} response: {}", request.model, e);
        })?;

        debug!("Answer received: {} bytes", answer.len());
        Ok(Message::new(Role::Assistant, answer))
    }

    /// Like [`respond`](Self::respond), but delivers the answer as a single
    /// chunk on `sender`. Returns the full message as well.
    pub async fn stream_reply(
        &self,
        request: &ChatRequest,
        sender: Sender<StreamChunk>,
    ) -> Result<Message, ChatError> {
        let message = self.respond(request).await?;
        if sender
            .send(StreamChunk::Content(message.content.clone()))
            .await
            .is_err()
        {
            warn!("Content chunk send failed: receiver dropped");
            return Err(ChatError::ChannelClosed);
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryStore};
    use crate::test_support::{RecordingTransport, user_request};
    use serde_json::json;
    use tokio::sync::mpsc;

    fn service(transport: Arc<RecordingTransport>, store: Arc<MemoryStore>) -> ChatService {
        ChatService::new(Arc::new(ModelCatalog::default()), transport, store)
    }

    #[tokio::test]
    async fn test_respond_parses_transport_response() {
        let transport = Arc::new(RecordingTransport::new(json!({
            "generation": "From the response, not the request."
        })));
        let svc = service(transport.clone(), Arc::new(MemoryStore::new()));

        let reply = svc.respond(&user_request("llama", "hi", None)).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "From the response, not the request.");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "meta.llama3-8b-instruct-v1:0");
    }

    #[tokio::test]
    async fn test_respond_grounds_on_stored_document() {
        let transport = Arc::new(RecordingTransport::new(json!({
            "content": [{"type": "text", "text": "Yes."}]
        })));
        let store = Arc::new(MemoryStore::new());
        let doc = Document::from_text("plan.pdf", "application/pdf", "Plan X covers dental.".into());
        store.store(&doc).await.unwrap();
        let svc = service(transport.clone(), store);

        let reply = svc
            .respond(&user_request("claude", "Does it cover dental?", Some(&doc.id)))
            .await
            .unwrap();
        assert_eq!(reply.content, "Yes.");

        let body = transport.calls()[0].1.to_json().unwrap();
        assert!(body.contains("Plan X covers dental."));
    }

    #[tokio::test]
    async fn test_missing_document_is_reported() {
        let transport = Arc::new(RecordingTransport::new(json!({})));
        let svc = service(transport.clone(), Arc::new(MemoryStore::new()));

        let err = svc
            .respond(&user_request("claude", "hi", Some("ghost")))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::DocumentNotFound(ref id) if id == "ghost"));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_model_never_reaches_transport() {
        let transport = Arc::new(RecordingTransport::new(json!({})));
        let svc = service(transport.clone(), Arc::new(MemoryStore::new()));

        let err = svc.respond(&user_request("gpt", "hi", None)).await.unwrap_err();
        assert!(matches!(err, ChatError::Adapter(AdapterError::UnknownProvider(_))));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_response_shape_is_rejected() {
        let transport = Arc::new(RecordingTransport::new(json!({"generation": "llama-shaped"})));
        let svc = service(transport, Arc::new(MemoryStore::new()));

        let err = svc.respond(&user_request("titan", "hi", None)).await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Adapter(AdapterError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_stream_reply_sends_single_chunk() {
        let transport = Arc::new(RecordingTransport::new(json!({
            "results": [{"outputText": "one shot"}]
        })));
        let svc = service(transport, Arc::new(MemoryStore::new()));

        let (tx, mut rx) = mpsc::channel(4);
        let message = svc
            .stream_reply(&user_request("titan", "hi", None), tx)
            .await
            .unwrap();
        assert_eq!(message.content, "one shot");
        assert_eq!(rx.recv().await, Some(StreamChunk::Content("one shot".to_string())));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_stream_reply_reports_dropped_receiver() {
        let transport = Arc::new(RecordingTransport::new(json!({"generation": "x"})));
        let svc = service(transport, Arc::new(MemoryStore::new()));

        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let err = svc
            .stream_reply(&user_request("llama", "hi", None), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::ChannelClosed));
    }
}
