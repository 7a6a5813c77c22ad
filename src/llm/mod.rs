//! LLM integration module
//!
//! This module provides trait-based LLM provider abstraction, the two
//! chat-completion backends, and per-invocation usage accounting.

pub mod client;
pub mod provider;
pub mod usage;

// Provider implementations
pub mod providers {
    pub mod azure;
    pub mod openai;
    pub(crate) mod wire;
}

use crate::config::LlmConfig;
use crate::error::Result;
use std::sync::Arc;

// Re-exports
pub use provider::{
    GenerationParams, LLMProvider, LLMResponse, Message, MessageRole, ToolCall, ToolDefinition,
};
pub use usage::{UsageRecord, UsageScope};

/// Build the chat-completion client selected by the configuration
///
/// Credentials are not checked here; a bad key shows up on the first request.
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match config {
        LlmConfig::Azure {
            endpoint,
            deployment,
            api_key,
            api_version,
        } => Arc::new(providers::azure::AzureOpenAIProvider::new(
            endpoint.as_str(),
            deployment.as_str(),
            api_key.as_str(),
            api_version.as_str(),
        )?),
        LlmConfig::OpenAI {
            model,
            api_key,
            base_url,
        } => Arc::new(providers::openai::OpenAIProvider::new(
            api_key.as_str(),
            Some(model.clone()),
            base_url.clone(),
        )?),
    };

    tracing::debug!(
        provider = provider.provider_name(),
        model = provider.model_name(),
        "LLM client ready"
    );
    Ok(provider)
}
