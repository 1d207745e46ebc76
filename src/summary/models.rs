use crate::error::SummarizeError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelOption {
    pub id: &'static str,
    pub alias: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const MODEL_CATALOG: &[ModelOption] = &[
    ModelOption {
        id: "deepseek/deepseek-chat-v3-0324:free",
        alias: "deepseek-v3",
        label: "DeepSeek V3",
        description: "Advanced reasoning model with strong performance",
    },
    ModelOption {
        id: "meta-llama/llama-3.3-70b-instruct:free",
        alias: "llama-3.3-70b",
        label: "Llama 3.3 70B Instruct (Meta)",
        description: "Large language model optimized for instruction following",
    },
    ModelOption {
        id: "google/gemini-2.0-flash-exp:free",
        alias: "gemini-2.0-flash",
        label: "Gemini Flash 2.0 Experimental (Google)",
        description: "Fast and efficient model for quick responses",
    },
];

pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";

pub fn find_model(id: &str) -> Option<&'static ModelOption> {
    MODEL_CATALOG.iter().find(|m| m.id == id)
}

/// Map a user-supplied model name to the identifier sent upstream.
///
/// Catalog ids and aliases resolve to the catalog id; anything else is passed
/// through as an opaque identifier.
pub fn resolve_model(raw: &str) -> Result<String, SummarizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SummarizeError::validation("model identifier cannot be empty"));
    }
    if let Some(found) = MODEL_CATALOG
        .iter()
        .find(|m| m.id == trimmed || m.alias.eq_ignore_ascii_case(trimmed))
    {
        return Ok(found.id.to_string());
    }
    tracing::warn!(model = trimmed, "model is not in the catalog; sending it as-is");
    Ok(trimmed.to_string())
}
