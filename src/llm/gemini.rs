use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    Grounding, GroundingChunk, ProviderRequest, ProviderResponse, TextProvider, TokenUsage,
    WebReference,
};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

// Gemini `generateContent` REST format
#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    grounding_chunks: Option<Vec<ApiGroundingChunk>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiGroundingChunk {
    web: Option<ApiWeb>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiWeb {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GeminiClient {
    pub fn new(api_key: Option<&str>, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.map(|k| k.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl TextProvider for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn generate_content(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .context("Gemini API key is not configured")?;

        let body = build_request_body(request);

        tracing::debug!(
            model = %request.model,
            use_search = request.use_search,
            prompt_chars = request.prompt.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        interpret_response(api_response)
    }
}

fn build_request_body(request: &ProviderRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: request.prompt.clone(),
            }],
        }],
        tools: request.use_search.then(|| {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        }),
    }
}

fn interpret_response(api_response: GenerateContentResponse) -> Result<ProviderResponse> {
    let usage = api_response.usage_metadata.map(|u| TokenUsage {
        input_tokens: u.prompt_token_count,
        output_tokens: u.candidates_token_count,
    });

    let candidate = api_response
        .candidates
        .into_iter()
        .next()
        .context("Gemini API returned no usable text (no candidates)")?;

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let grounding = match candidate
        .grounding_metadata
        .and_then(|m| m.grounding_chunks)
    {
        Some(chunks) => Grounding::Chunks(
            chunks
                .into_iter()
                .map(|chunk| GroundingChunk {
                    web: chunk.web.map(|w| WebReference {
                        uri: w.uri,
                        title: w.title,
                    }),
                })
                .collect(),
        ),
        None => Grounding::Absent,
    };

    Ok(ProviderResponse {
        text,
        grounding,
        usage,
    })
}
