//! Provider adapter for the Bedrock invoke API.
//!
//! Each backend wants a different body:
//! - Claude: an `anthropic_version` message array, answer at `content[0].text`
//! - Titan: flattened tagged text in `inputText`, answer at `results[0].outputText`
//! - Llama: flattened tagged text in `prompt`, answer at `generation`
//!
//! Everything here is pure. No I/O, no shared state.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Provider;
use crate::inference::{AdapterError, ModelCatalog, Role, Turn};

// ============================================================================
// Generation Parameters
// ============================================================================

pub const MAX_OUTPUT_TOKENS: u32 = 1024;
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.9;
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

// ============================================================================
// System Instruction
// ============================================================================

const GROUNDED_INSTRUCTION: &str = "You are a healthcare benefits assistant. \
    Your job is to help users understand their healthcare benefits based on the documents they've provided. \
    Answer questions accurately and concisely based solely on the information in the provided documents. \
    If the information is not available in the documents, clearly state that you cannot find the relevant information.";

pub const NO_DOCUMENT_INSTRUCTION: &str = "You are a healthcare benefits assistant. \
    Your job is to help users understand their healthcare benefits. \
    Since no documents have been provided, you can only answer general questions about healthcare benefits \
    and cannot provide specific policy details. \
    Please ask the user to upload their benefits documents for more specific assistance.";

/// The system instruction for a conversation, grounded in `document` when present.
pub fn system_instruction(document: Option<&str>) -> String {
    match document {
        Some(text) => format!("{GROUNDED_INSTRUCTION} Here is the document content: {text}"),
        None => NO_DOCUMENT_INSTRUCTION.to_string(),
    }
}

// ============================================================================
// Request Payloads
// ============================================================================

/// Claude keeps only two conversational roles; system turns fold into user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClaudeMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClaudeRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub messages: Vec<ClaudeMessage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationConfig {
    pub max_token_count: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitanRequest {
    pub input_text: String,
    pub text_generation_config: TextGenerationConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LlamaRequest {
    pub prompt: String,
    pub max_gen_len: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// A provider-shaped request body. Serializes to the bare provider document.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RequestPayload {
    Claude(ClaudeRequest),
    Titan(TitanRequest),
    Llama(LlamaRequest),
}

impl RequestPayload {
    pub fn provider(&self) -> Provider {
        match self {
            RequestPayload::Claude(_) => Provider::Claude,
            RequestPayload::Titan(_) => Provider::Titan,
            RequestPayload::Llama(_) => Provider::Llama,
        }
    }

    pub fn to_json(&self) -> Result<String, AdapterError> {
        serde_json::to_string(self).map_err(|e| AdapterError::Serialize(e.to_string()))
    }
}

/// A payload ready for the transport, plus the model id to invoke.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedRequest {
    pub model_id: String,
    pub payload: RequestPayload,
}

// ============================================================================
// Response Payloads
// ============================================================================

#[derive(Deserialize, Debug)]
struct ClaudeContentBlock {
    text: String,
}

#[derive(Deserialize, Debug)]
struct ClaudeResponse {
    content: Vec<ClaudeContentBlock>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TitanResult {
    output_text: String,
}

#[derive(Deserialize, Debug)]
struct TitanResponse {
    results: Vec<TitanResult>,
}

#[derive(Deserialize, Debug)]
struct LlamaResponse {
    generation: String,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Claude message array: system instruction first, then every turn with
/// non-assistant roles collapsed to `user`.
fn turns_to_claude_messages(instruction: String, turns: &[Turn]) -> Vec<ClaudeMessage> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ClaudeMessage {
        role: MessageRole::System,
        content: instruction,
    });
    messages.extend(turns.iter().map(|t| ClaudeMessage {
        role: match t.role {
            Role::Assistant => MessageRole::Assistant,
            Role::User | Role::System => MessageRole::User,
        },
        content: t.content.clone(),
    }));
    messages
}

/// Flattened prompt shared by Titan and Llama.
///
/// `<system>…</system>\n` + newline-joined tagged turns + an open `<assistant>`
/// tag marking where generation continues.
pub fn render_tagged_prompt(instruction: &str, turns: &[Turn]) -> String {
    let body = turns
        .iter()
        .map(|t| match t.role {
            Role::Assistant => format!("<assistant>{}</assistant>", t.content),
            Role::User | Role::System => format!("<user>{}</user>", t.content),
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("<system>{instruction}</system>\n{body}<assistant>")
}

/// Shapes a conversation into the request body for `provider`.
///
/// The catalog lookup and the variant lookup are separate checks: an id can be
/// in the catalog (added through config) and still have no payload shape.
pub fn build_request(
    catalog: &ModelCatalog,
    provider: &str,
    turns: &[Turn],
    document: Option<&str>,
) -> Result<AdaptedRequest, AdapterError> {
    let model_id = catalog.resolve_model_identifier(provider)?.to_string();
    let variant: Provider = provider.parse()?;
    let instruction = system_instruction(document);

    let payload = match variant {
        Provider::Claude => RequestPayload::Claude(ClaudeRequest {
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            max_tokens: MAX_OUTPUT_TOKENS,
            messages: turns_to_claude_messages(instruction, turns),
        }),
        Provider::Titan => RequestPayload::Titan(TitanRequest {
            input_text: render_tagged_prompt(&instruction, turns),
            text_generation_config: TextGenerationConfig {
                max_token_count: MAX_OUTPUT_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
            },
        }),
        Provider::Llama => RequestPayload::Llama(LlamaRequest {
            prompt: render_tagged_prompt(&instruction, turns),
            max_gen_len: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }),
    };

    debug!(
        "Built {} request: model={}, turns={}, grounded={}",
        variant,
        model_id,
        turns.len(),
        document.is_some()
    );

    Ok(AdaptedRequest { model_id, payload })
}

/// Pulls the answer text out of a provider response. The text is returned as-is.
pub fn extract_answer_text(provider: &str, response: &Value) -> Result<String, AdapterError> {
    let variant: Provider = provider.parse()?;
    let malformed = |message: String| AdapterError::MalformedResponse {
        provider: variant,
        message,
    };

    match variant {
        Provider::Claude => {
            let parsed = ClaudeResponse::deserialize(response).map_err(|e| malformed(e.to_string()))?;
            parsed
                .content
                .into_iter()
                .next()
                .map(|block| block.text)
                .ok_or_else(|| malformed("empty content list".to_string()))
        }
        Provider::Titan => {
            let parsed = TitanResponse::deserialize(response).map_err(|e| malformed(e.to_string()))?;
            parsed
                .results
                .into_iter()
                .next()
                .map(|result| result.output_text)
                .ok_or_else(|| malformed("empty results list".to_string()))
        }
        Provider::Llama => {
            let parsed = LlamaResponse::deserialize(response).map_err(|e| malformed(e.to_string()))?;
            Ok(parsed.generation)
        }
    }
}
