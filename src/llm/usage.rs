//! Token usage and cost accounting
//!
//! A [`UsageScope`] is opened around one agent invocation and collects the
//! token counts of every LLM response produced during it. Scopes are never
//! reused, so each invocation starts from zero.

use crate::llm::provider::LLMResponse;
use std::fmt;

/// USD per 1K tokens as (prompt, completion), keyed by model family prefix
const MODEL_PRICES: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.00015, 0.0006),
    ("gpt-4o", 0.0025, 0.01),
    ("gpt-4.1-nano", 0.0001, 0.0004),
    ("gpt-4.1-mini", 0.0004, 0.0016),
    ("gpt-4.1", 0.002, 0.008),
    ("gpt-4-turbo", 0.01, 0.03),
    ("gpt-4-32k", 0.06, 0.12),
    ("gpt-4", 0.03, 0.06),
    ("gpt-3.5-turbo-16k", 0.003, 0.004),
    ("gpt-3.5-turbo-instruct", 0.0015, 0.002),
    ("gpt-3.5-turbo", 0.0015, 0.002),
];

/// Normalize Azure and fine-tune model names to the public family names
fn normalize_model_name(model: &str) -> String {
    let model = model.trim().to_lowercase();
    let model = model.strip_prefix("ft:").unwrap_or(&model);
    model.replace("gpt-35", "gpt-3.5")
}

/// Per-1K-token prices for a model, longest known prefix wins
pub fn model_prices(model: &str) -> Option<(f64, f64)> {
    let normalized = normalize_model_name(model);
    MODEL_PRICES
        .iter()
        .filter(|(prefix, _, _)| normalized.starts_with(prefix))
        .max_by_key(|(prefix, _, _)| prefix.len())
        .map(|&(_, prompt, completion)| (prompt, completion))
}

/// Estimated USD cost of a call; unknown models cost nothing
pub fn estimate_cost(model: &str, prompt_tokens: u64, completion_tokens: u64) -> f64 {
    match model_prices(model) {
        Some((prompt, completion)) => {
            (prompt_tokens as f64 / 1000.0) * prompt + (completion_tokens as f64 / 1000.0) * completion
        }
        None => 0.0,
    }
}

/// Counters for one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageRecord {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// Estimated cost in USD
    pub total_cost: f64,
    pub successful_requests: u32,
}

impl UsageRecord {
    /// Fold another record into this one
    pub fn add(&mut self, other: &UsageRecord) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        self.total_cost += other.total_cost;
        self.successful_requests += other.successful_requests;
    }

    /// Lines shown after each answer
    pub fn display_lines(&self) -> Vec<String> {
        vec![
            format!("Prompt Tokens: {}", self.prompt_tokens),
            format!("Completion Tokens: {}", self.completion_tokens),
            format!("Total Tokens: {}", self.total_tokens),
            format!("Total Cost (USD): ${}", self.total_cost),
        ]
    }
}

impl fmt::Display for UsageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_lines().join("\n"))
    }
}

/// Usage accumulated during a single agent invocation
#[derive(Debug, Default)]
pub struct UsageScope {
    record: UsageRecord,
}

impl UsageScope {
    /// Open an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the usage reported by one LLM response
    ///
    /// Pricing uses the model named in the response, falling back to
    /// `fallback_model` (the configured model or deployment) when the
    /// provider does not report one.
    pub fn record_response(&mut self, response: &LLMResponse, fallback_model: &str) {
        let prompt = u64::from(response.input_tokens.unwrap_or(0));
        let completion = u64::from(response.output_tokens.unwrap_or(0));
        let total = response
            .get_total_tokens()
            .map(u64::from)
            .unwrap_or(prompt + completion);
        let model = response.model.as_deref().unwrap_or(fallback_model);

        self.record.add(&UsageRecord {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: total,
            total_cost: estimate_cost(model, prompt, completion),
            successful_requests: 1,
        });
    }

    /// Fold a precomputed record into the scope
    pub fn add(&mut self, record: UsageRecord) {
        self.record.add(&record);
    }

    /// Counters so far
    pub fn snapshot(&self) -> UsageRecord {
        self.record
    }

    /// Close the scope and take its counters
    pub fn finish(self) -> UsageRecord {
        self.record
    }
}
