//! Per-role model configuration.

/// Configuration for one model role (generation, enhancement, or embeddings).
///
/// `endpoint` is the API base, e.g. `https://openrouter.ai/api/v1`; the
/// client appends `/chat/completions` or `/embeddings`.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmModelConfig {
    /// Model identifier, e.g. `google/gemini-2.5-flash`.
    pub model: String,
    /// API base URL.
    pub endpoint: String,
    /// Bearer token, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl LlmModelConfig {
    pub fn new(model: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            timeout_secs: 8,
        }
    }
}
