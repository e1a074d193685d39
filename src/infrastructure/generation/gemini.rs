use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use crate::domain::generation::{FinishReason, Usage};
use crate::domain::{DomainError, GenerationRequest, GenerationResponse, TextGenerator};

const BACKEND: &str = "gemini";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro-latest";

/// Google Gemini `generateContent` backend
#[derive(Debug)]
pub struct GeminiGenerator<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> GeminiGenerator<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, DEFAULT_GEMINI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn generate_content_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request(&self, request: &GenerationRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        });

        let mut generation_config = serde_json::Map::new();

        if let Some(temp) = request.temperature {
            generation_config.insert("temperature".into(), serde_json::json!(temp));
        }

        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".into(), serde_json::json!(max_tokens));
        }

        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<GenerationResponse, DomainError> {
        let response: GeminiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::generation_backend(BACKEND, format!("Failed to parse response: {}", e))
        })?;

        if let Some(feedback) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(DomainError::generation_backend(
                BACKEND,
                format!("Prompt blocked: {}", feedback),
            ));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::generation_backend(BACKEND, "No candidates in response"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(DomainError::generation_backend(
                BACKEND,
                "Empty candidate content",
            ));
        }

        let model = response.model_version.unwrap_or_else(|| self.model.clone());
        let mut generation = GenerationResponse::new(model, text);

        if let Some(reason) = candidate.finish_reason {
            generation = generation.with_finish_reason(parse_finish_reason(&reason));
        }

        if let Some(usage) = response.usage_metadata {
            generation = generation.with_usage(Usage::new(
                usage.prompt_token_count,
                usage.candidates_token_count,
            ));
        }

        Ok(generation)
    }
}

#[async_trait]
impl<C: HttpClientTrait> TextGenerator for GeminiGenerator<C> {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, DomainError> {
        let url = self.generate_content_url();
        let body = self.build_request(&request);

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| DomainError::generation_backend(BACKEND, e.to_string()))?;

        self.parse_response(response)
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Other,
    }
}

// Gemini API types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
