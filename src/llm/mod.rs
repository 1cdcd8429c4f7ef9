pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;

pub use gemini::GeminiClient;

/// A single-turn generation call: one user message, optional web search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub model: String,
    pub prompt: String,
    pub use_search: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebReference {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingChunk {
    pub web: Option<WebReference>,
}

/// Search grounding attached to a response, if the provider sent any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Grounding {
    #[default]
    Absent,
    Chunks(Vec<GroundingChunk>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: String,
    pub grounding: Grounding,
    pub usage: Option<TokenUsage>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Whether a credential is available. Callers check this before any request.
    fn is_configured(&self) -> bool;

    async fn generate_content(&self, request: &ProviderRequest) -> Result<ProviderResponse>;
}
