pub mod adapter;
pub mod bedrock;
pub mod catalog;
pub mod provider;
pub mod types;

pub use adapter::{AdaptedRequest, RequestPayload, build_request, extract_answer_text};
pub use bedrock::BedrockTransport;
pub use catalog::{ModelCatalog, ModelOption};
pub use provider::{AdapterError, InferenceTransport, TransportError};
pub use types::{ChatRequest, Message, Role, StreamChunk, Turn};
