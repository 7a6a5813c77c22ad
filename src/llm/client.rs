//! LLM HTTP Client
//!
//! This module provides a reusable HTTP client for making requests to LLM APIs,
//! with built-in retry logic, exponential backoff, and error handling.

use crate::error::{NlSqlError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;

/// Default maximum number of retry attempts
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default initial retry delay in milliseconds
const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;

/// Default timeout for HTTP requests (in seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// HTTP client for LLM API requests
#[derive(Clone)]
pub struct LLMHttpClient {
    /// Reqwest HTTP client
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Initial retry delay in milliseconds
    initial_delay_ms: u64,
}

impl LLMHttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
        })
    }

    /// Make a POST request with retry logic
    ///
    /// # Arguments
    /// * `provider` - Provider name used in error messages
    /// * `url` - Request URL
    /// * `headers` - Request headers
    /// * `body` - Request body (serializable)
    ///
    /// # Returns
    /// Response body as string
    pub async fn post_with_retry<T: Serialize>(
        &self,
        provider: &str,
        url: &str,
        headers: HeaderMap,
        body: &T,
    ) -> Result<String> {
        let mut attempt = 0;
        loop {
            let sent = self
                .client
                .post(url)
                .headers(headers.clone())
                .json(body)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.max_retries => {
                    tracing::warn!(provider, attempt, error = %e, "LLM request failed, retrying");
                    self.backoff(attempt).await;
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(NlSqlError::Http(e)),
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response.text().await?);
            }

            if self.should_retry(status, attempt) {
                tracing::warn!(provider, attempt, status = status.as_u16(), "LLM request rejected, retrying");
                self.backoff(attempt).await;
                attempt += 1;
                continue;
            }

            let response_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            return Err(NlSqlError::LLMApiError {
                provider: provider.to_string(),
                message: response_text,
                status: status.as_u16(),
            });
        }
    }

    async fn backoff(&self, attempt: u32) {
        tokio::time::sleep(Duration::from_millis(self.calculate_delay(attempt))).await;
    }

    /// Check if a request should be retried
    fn should_retry(&self, status: StatusCode, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::REQUEST_TIMEOUT
            || status.is_server_error()
    }

    /// Calculate retry delay with exponential backoff
    fn calculate_delay(&self, attempt: u32) -> u64 {
        self.initial_delay_ms * 2_u64.pow(attempt)
    }

    /// Build standard headers for API requests using a bearer token
    pub fn build_headers(api_key: &str) -> Result<HeaderMap> {
        Self::build_headers_with_auth(AUTHORIZATION.as_str(), &format!("Bearer {}", api_key))
    }

    /// Build headers with custom authorization format
    pub fn build_headers_with_auth(auth_header: &str, auth_value: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::add_header(headers, auth_header, auth_value)
    }

    /// Add custom header to existing headers
    pub fn add_header(mut headers: HeaderMap, key: &str, value: &str) -> Result<HeaderMap> {
        let key_header = HeaderName::from_str(key)
            .map_err(|_| NlSqlError::InvalidHeader(format!("Invalid header name: {}", key)))?;
        // The value is usually a credential, so it is not echoed back.
        let value_header = HeaderValue::from_str(value)
            .map_err(|_| NlSqlError::InvalidHeader(format!("Invalid value for header {}", key)))?;

        headers.insert(key_header, value_header);
        Ok(headers)
    }
}
