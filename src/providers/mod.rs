/*!
 * Provider implementations for the language-model backends.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: OpenAI chat completions API (also used for LM Studio)
 * - Anthropic: Anthropic messages API
 * - Ollama: Local LLM server
 * - Mock: scriptable provider for tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use url::Url;

use crate::app_config::{ProviderConfig, TranslationCommonConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

/// A single prompt sent to a backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System prompt shared by every call of a batch
    pub system: Option<String>,
    /// User message
    pub user: String,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request for the given user message
    pub fn new(user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: None,
            user: user.into(),
            temperature: None,
            max_tokens,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Raw text plus usage reported by a backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub text: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably for translation and arbitration.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Model this provider talks to
    fn model(&self) -> &str;
}

/// Parse an endpoint string into scheme, host and port
pub(crate) fn parse_endpoint(endpoint: &str) -> Result<(String, String, u16), ProviderError> {
    if endpoint.is_empty() {
        return Err(ProviderError::ConnectionError("Endpoint cannot be empty".to_string()));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)
    } else {
        Url::parse(&format!("http://{}", endpoint))
    }
    .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint {}: {}", endpoint, e)))?;

    let host = url
        .host_str()
        .ok_or_else(|| ProviderError::ConnectionError(format!("Invalid host in endpoint: {}", endpoint)))?
        .to_string();

    let port = url.port().unwrap_or(if url.scheme() == "https" { 443 } else { 80 });

    Ok((url.scheme().to_string(), host, port))
}

/// Build the client for a configured backend
pub fn build_provider(
    config: &ProviderConfig,
    common: &TranslationCommonConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let model = config.model_or_default();
    let endpoint = config.endpoint_or_default();
    let retry_count = common.retry_count;
    let retry_backoff_ms = common.retry_backoff_ms;

    let provider: Arc<dyn Provider> = match config.provider_type {
        TranslationProvider::OpenAI => Arc::new(openai::OpenAI::new_with_config(
            config.resolved_api_key(),
            endpoint,
            model,
            retry_count,
            retry_backoff_ms,
            config.rate_limit,
        )),
        TranslationProvider::LMStudio => {
            // LM Studio often doesn't require an API key; use a default if empty
            let api_key = {
                let k = config.resolved_api_key();
                if k.is_empty() { "lm-studio".to_string() } else { k }
            };
            Arc::new(openai::OpenAI::new_with_config(
                api_key,
                endpoint,
                model,
                retry_count,
                retry_backoff_ms,
                config.rate_limit,
            ))
        }
        TranslationProvider::Anthropic => Arc::new(anthropic::Anthropic::new_with_config(
            config.resolved_api_key(),
            endpoint,
            model,
            retry_count,
            retry_backoff_ms,
            config.rate_limit,
        )),
        TranslationProvider::Ollama => {
            let (scheme, host, port) = parse_endpoint(&endpoint)?;
            Arc::new(ollama::Ollama::new_with_config(
                &format!("{}://{}", scheme, host),
                port,
                model,
                retry_count,
                retry_backoff_ms,
                config.rate_limit,
            ))
        }
    };

    Ok(provider)
}

/// Delay before retry `attempt` (1-based), doubling from the base
pub(crate) fn backoff_delay(backoff_base_ms: u64, attempt: u32) -> std::time::Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(10);
    std::time::Duration::from_millis(backoff_base_ms.saturating_mul(factor))
}

/// Run an HTTP call, retrying transient failures with exponential backoff.
///
/// When a rate limit (requests per minute) is set, retries are spaced at
/// least `60s / rate_limit` apart.
pub(crate) async fn send_with_retry<T, F, Fut>(
    provider_name: &str,
    max_retries: u32,
    backoff_base_ms: u64,
    rate_limit: Option<u32>,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                let mut delay = backoff_delay(backoff_base_ms, attempt);
                if let Some(rpm) = rate_limit.filter(|rpm| *rpm > 0) {
                    delay = delay.max(std::time::Duration::from_millis(60_000 / rpm as u64));
                }
                log::warn!(
                    "{} request failed ({}), retrying in {:?} (attempt {}/{})",
                    provider_name, e, delay, attempt, max_retries
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                log::error!("{} request failed: {}", provider_name, e);
                return Err(e);
            }
        }
    }
}

/// Map a reqwest transport error to a provider error
pub(crate) fn transport_error(provider_name: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", provider_name, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider_name, error))
    }
}
