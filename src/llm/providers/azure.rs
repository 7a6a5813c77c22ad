//! Azure OpenAI Provider
//!
//! Talks to a model deployment hosted in an Azure OpenAI resource. The
//! deployment name is part of the URL and authentication uses the `api-key`
//! header instead of a bearer token.

use crate::config::env::{
    AZURE_OPENAI_API_VERSION, AZURE_OPENAI_DEPLOYMENT_NAME, AZURE_OPENAI_ENDPOINT,
};
use crate::error::{NlSqlError, Result};
use crate::llm::client::LLMHttpClient;
use crate::llm::provider::{GenerationParams, LLMProvider, LLMResponse, Message, ToolDefinition};
use crate::llm::providers::wire::{self, ChatRequest};
use async_trait::async_trait;

/// Azure OpenAI deployment provider
pub struct AzureOpenAIProvider {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    endpoint: String,
    /// Deployment name
    deployment: String,
    api_key: String,
    api_version: String,
    client: LLMHttpClient,
}

impl AzureOpenAIProvider {
    pub fn new(
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            deployment: deployment.into(),
            api_key: api_key.into(),
            api_version: api_version.into(),
            client: LLMHttpClient::new()?,
        })
    }

    /// Fail the request early when a URL component was never configured
    fn check_settings(&self) -> Result<()> {
        let settings = [
            (AZURE_OPENAI_ENDPOINT, &self.endpoint),
            (AZURE_OPENAI_DEPLOYMENT_NAME, &self.deployment),
            (AZURE_OPENAI_API_VERSION, &self.api_version),
        ];
        match settings.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(NlSqlError::Config(format!("{} is not set", name))),
            None => Ok(()),
        }
    }

    /// Full Chat Completions URL for the deployment
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

#[async_trait]
impl LLMProvider for AzureOpenAIProvider {
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        params: Option<&GenerationParams>,
    ) -> Result<LLMResponse> {
        self.check_settings()?;

        let defaults = GenerationParams::default();
        let request = ChatRequest::new(None, messages, tools, params.unwrap_or(&defaults));

        let headers = LLMHttpClient::build_headers_with_auth("api-key", &self.api_key)?;
        let response_text = self
            .client
            .post_with_retry(self.provider_name(), &self.completions_url(), headers, &request)
            .await?;

        wire::parse_response(self.provider_name(), &response_text)
    }

    fn provider_name(&self) -> &str {
        "Azure OpenAI"
    }

    fn model_name(&self) -> &str {
        &self.deployment
    }

    fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}
