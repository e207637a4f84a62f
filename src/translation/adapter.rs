/*!
 * Translation provider adapter.
 *
 * Wraps one `Provider` behind a uniform translation call: it builds the
 * request from the shared system prompt and the segment instruction, applies
 * the per-call timeout, trims the reply and attaches the provider's fixed
 * prior confidence plus duration metadata. Retries live in the HTTP clients.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{ProviderConfig, TranslationCommonConfig};
use crate::errors::ProviderError;
use crate::language_utils::SupportedLanguage;
use crate::providers::{build_provider, CompletionRequest, Provider};
use crate::translation::duration::{estimate_for_language, pacing_ratio, word_count};
use crate::translation::prompts::build_segment_instruction;
use crate::translation::segment::TranslationSegment;

/// Default per-call timeout
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Metadata attached to a single provider translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationMetadata {
    pub word_count: usize,
    pub estimated_duration_seconds: f64,
    /// Estimated over available duration; above 1.0 the dub runs long
    pub pacing_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    pub latency_ms: u64,
}

/// One provider's translation of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTranslationResult {
    pub translated_text: String,
    /// Fixed prior of the provider, not derived from the output
    pub confidence: f64,
    /// Model label
    pub model: String,
    pub metadata: TranslationMetadata,
}

/// Uniform translation call over one backend
#[derive(Debug, Clone)]
pub struct TranslationProviderAdapter {
    provider: Arc<dyn Provider>,
    label: String,
    prior_confidence: f64,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl TranslationProviderAdapter {
    /// Wrap a provider; the label defaults to its model name
    pub fn new(provider: Arc<dyn Provider>, prior_confidence: f64) -> Self {
        let defaults = TranslationCommonConfig::default();
        Self {
            label: provider.model().to_string(),
            provider,
            prior_confidence,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Build the adapter and its client from configuration
    pub fn from_config(config: &ProviderConfig, common: &TranslationCommonConfig) -> Result<Self, ProviderError> {
        let provider = build_provider(config, common)?;
        Ok(Self::new(provider, config.prior_confidence)
            .with_temperature(common.temperature)
            .with_max_tokens(common.max_tokens)
            .with_timeout(Duration::from_secs(config.timeout_secs)))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn prior_confidence(&self) -> f64 {
        self.prior_confidence
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Underlying client, shared with the arbiter when configured so
    pub fn provider(&self) -> Arc<dyn Provider> {
        Arc::clone(&self.provider)
    }

    /// Translate one segment with the batch's shared system prompt
    pub async fn translate(
        &self,
        segment: &TranslationSegment,
        language: &SupportedLanguage,
        system_prompt: &str,
    ) -> Result<ProviderTranslationResult, ProviderError> {
        let request = CompletionRequest::new(build_segment_instruction(segment, language.display_name), self.max_tokens)
            .system(system_prompt)
            .temperature(self.temperature);

        let started = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| ProviderError::Timeout {
                millis: self.timeout.as_millis() as u64,
            })??;
        let latency_ms = started.elapsed().as_millis() as u64;

        let translated_text = response.text.trim().to_string();
        if translated_text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        debug!(
            "{} translated segment {} into {} in {}ms",
            self.label, segment.id, language.code, latency_ms
        );

        let estimated_duration_seconds = estimate_for_language(&translated_text, language);

        Ok(ProviderTranslationResult {
            metadata: TranslationMetadata {
                word_count: word_count(&translated_text),
                estimated_duration_seconds,
                pacing_ratio: pacing_ratio(estimated_duration_seconds, segment.duration_secs()),
                prompt_tokens: response.prompt_tokens,
                completion_tokens: response.completion_tokens,
                latency_ms,
            },
            translated_text,
            confidence: self.prior_confidence,
            model: self.label.clone(),
        })
    }
}
