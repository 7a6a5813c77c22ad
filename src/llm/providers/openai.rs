//! OpenAI API Provider
//!
//! This module implements the LLMProvider trait for the OpenAI Chat
//! Completions API, or any server that speaks the same protocol at a custom
//! base URL.

use crate::config::env::DEFAULT_MODEL_NAME;
use crate::error::Result;
use crate::llm::client::LLMHttpClient;
use crate::llm::provider::{GenerationParams, LLMProvider, LLMResponse, Message, ToolDefinition};
use crate::llm::providers::wire::{self, ChatRequest};
use async_trait::async_trait;

/// OpenAI API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI GPT API provider
pub struct OpenAIProvider {
    /// API key for authentication
    api_key: String,
    /// Model to use (e.g., "gpt-4o", "gpt-3.5-turbo")
    model: String,
    /// Base URL without the `/chat/completions` suffix
    base_url: String,
    /// HTTP client for making requests
    client: LLMHttpClient,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `model` - Model identifier (defaults to gpt-3.5-turbo)
    /// * `base_url` - Custom API base, `None` for the public endpoint
    pub fn new(
        api_key: impl Into<String>,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            base_url: base_url.unwrap_or_else(|| OPENAI_API_BASE.to_string()),
            client: LLMHttpClient::new()?,
        })
    }

    /// Full Chat Completions URL
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        params: Option<&GenerationParams>,
    ) -> Result<LLMResponse> {
        let defaults = GenerationParams::default();
        let request = ChatRequest::new(
            Some(self.model.clone()),
            messages,
            tools,
            params.unwrap_or(&defaults),
        );

        let headers = LLMHttpClient::build_headers(&self.api_key)?;
        let response_text = self
            .client
            .post_with_retry(self.provider_name(), &self.completions_url(), headers, &request)
            .await?;

        wire::parse_response(self.provider_name(), &response_text)
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}
