use std::time::Instant;

use crate::errors::{GenerationError, GenerationResult};
use crate::llm::{Grounding, ProviderRequest, ProviderResponse, TextProvider};

use super::prompt::{self, BuiltPrompt};
use super::{Citation, GenerationOutcome, MaterialRequest};

pub struct MaterialGenerator<P> {
    provider: P,
    model: String,
}

impl<P: TextProvider> MaterialGenerator<P> {
    pub fn new(provider: P, model: String) -> Self {
        Self { provider, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One provider round trip per call. Failures are never retried.
    pub async fn generate(&self, request: &MaterialRequest) -> GenerationResult<GenerationOutcome> {
        if !self.provider.is_configured() {
            return Err(GenerationError::Configuration(
                "Gemini API key is not configured.".into(),
            ));
        }

        let BuiltPrompt {
            prompt,
            use_grounding,
        } = prompt::build(request);

        let provider_request = ProviderRequest {
            model: self.model.clone(),
            prompt,
            use_search: use_grounding,
        };

        let start = Instant::now();
        let response = self
            .provider
            .generate_content(&provider_request)
            .await
            .map_err(|e| {
                let err = GenerationError::from(e);
                tracing::error!(
                    kind = ?request.kind,
                    code = err.error_code(),
                    error = %err,
                    "generation failed"
                );
                err
            })?;

        let (input_tokens, output_tokens) = response
            .usage
            .map_or((0, 0), |u| (u.input_tokens, u.output_tokens));
        tracing::info!(
            kind = ?request.kind,
            model = %self.model,
            grounded = use_grounding,
            latency_ms = start.elapsed().as_millis() as u64,
            input_tokens,
            output_tokens,
            "generation finished"
        );

        Ok(normalize(response, use_grounding))
    }
}

fn normalize(response: ProviderResponse, use_grounding: bool) -> GenerationOutcome {
    let sources = match response.grounding {
        Grounding::Chunks(chunks) if use_grounding => Some(
            chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| {
                    let uri = web.uri.filter(|u| !u.is_empty())?;
                    let title = web
                        .title
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| uri.clone());
                    Some(Citation { uri, title })
                })
                .collect(),
        ),
        _ => None,
    };

    GenerationOutcome {
        text: response.text,
        sources,
    }
}
