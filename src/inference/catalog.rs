//! # Model Catalog
//!
//! Static lookup from provider id (`"claude"`, `"titan"`, `"llama"`) to the
//! backend model id that goes into the invoke URL. Built once at startup from
//! the built-in table plus any `[[models]]` entries in the config file, then
//! shared read-only.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::AdapterError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub model_id: String,
}

impl ModelOption {
    fn builtin(id: &str, name: &str, description: &str, model_id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            model_id: model_id.to_string(),
        }
    }
}

/// The models shipped with the binary.
pub fn builtin_models() -> Vec<ModelOption> {
    vec![
        ModelOption::builtin(
            "claude",
            "Anthropic Claude",
            "General purpose AI assistant with strong reasoning capabilities",
            "anthropic.claude-3-haiku-20240307-v1:0",
        ),
        ModelOption::builtin(
            "titan",
            "Amazon Titan",
            "AWS-built language model focused on accuracy and safety",
            "amazon.titan-text-express-v1",
        ),
        ModelOption::builtin(
            "llama",
            "Meta Llama 3",
            "Open-source model with strong capabilities",
            "meta.llama3-8b-instruct-v1:0",
        ),
    ]
}

/// Immutable provider-id → model table.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    entries: HashMap<String, ModelOption>,
    /// Insertion order, for listing.
    order: Vec<String>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(builtin_models())
    }
}

impl ModelCatalog {
    /// Builds a catalog. Later entries with the same id replace earlier ones
    /// but keep the earlier listing position.
    pub fn new(options: impl IntoIterator<Item = ModelOption>) -> Self {
        let mut entries = HashMap::new();
        let mut order = Vec::new();
        for option in options {
            if !entries.contains_key(&option.id) {
                order.push(option.id.clone());
            }
            entries.insert(option.id.clone(), option);
        }
        Self { entries, order }
    }

    /// Built-in models overlaid with `overrides` (typically from config).
    pub fn with_overrides(overrides: &[ModelOption]) -> Self {
        for o in overrides {
            debug!("Catalog override: {} -> {}", o.id, o.model_id);
        }
        Self::new(builtin_models().into_iter().chain(overrides.iter().cloned()))
    }

    /// Maps a provider id to its backend model id.
    pub fn resolve_model_identifier(&self, provider: &str) -> Result<&str, AdapterError> {
        self.entries
            .get(provider)
            .map(|o| o.model_id.as_str())
            .ok_or_else(|| AdapterError::UnknownProvider(provider.to_string()))
    }

    pub fn options(&self) -> impl Iterator<Item = &ModelOption> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
