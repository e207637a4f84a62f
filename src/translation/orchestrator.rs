/*!
 * Translation orchestrator.
 *
 * Drives a batch of segments through both providers and the merge resolver:
 * - Language and segment validation happens before any provider call
 * - The system prompt is built once and shared by both providers
 * - Both provider calls of a segment run concurrently
 * - Output order always equals input order
 * - Any provider failure aborts the batch with no partial result
 */

use futures::stream::{self, StreamExt};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::pin::pin;
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::{ProviderError, TranslationError};
use crate::language_utils::{resolve_language, SupportedLanguage};
use crate::providers::build_provider;
use crate::translation::adapter::TranslationProviderAdapter;
use crate::translation::arbiter::VerificationArbiter;
use crate::translation::merge::{MergeResolver, MergeStrategy, MergedTranslation};
use crate::translation::prompts::build_system_prompt;
use crate::translation::segment::{TranslationContext, TranslationSegment};

/// Token and call accounting for a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Translation calls, two per segment
    pub provider_calls: u64,
    /// Verification calls issued in the verified-selection band
    pub arbiter_calls: u64,
    /// Summed latency of translation calls
    pub api_duration_ms: u64,
}

impl UsageTotals {
    /// Add the calls behind one merged segment
    pub fn record(&mut self, merged: &MergedTranslation) {
        for result in [&merged.provider_results.a, &merged.provider_results.b] {
            self.prompt_tokens += result.metadata.prompt_tokens.unwrap_or(0);
            self.completion_tokens += result.metadata.completion_tokens.unwrap_or(0);
            self.api_duration_ms += result.metadata.latency_ms;
            self.provider_calls += 1;
        }
        if merged.merge_strategy == MergeStrategy::VerifiedSelection {
            self.arbiter_calls += 1;
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Merged translations of a whole batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTranslationResult {
    /// ISO 639-1 code of the resolved target language
    pub target_language: String,
    pub segments: Vec<MergedTranslation>,
    /// Mean of segment confidences, 0.0 for an empty batch
    pub overall_confidence: f64,
    pub usage: UsageTotals,
}

impl BatchTranslationResult {
    fn from_segments(language: &SupportedLanguage, segments: Vec<MergedTranslation>) -> Self {
        let overall_confidence = if segments.is_empty() {
            0.0
        } else {
            segments.iter().map(|s| s.confidence).sum::<f64>() / segments.len() as f64
        };

        let mut usage = UsageTotals::default();
        for merged in &segments {
            usage.record(merged);
        }

        Self {
            target_language: language.code.to_string(),
            segments,
            overall_confidence,
            usage,
        }
    }

    /// Segments in the given regime
    pub fn count_by_strategy(&self, strategy: MergeStrategy) -> usize {
        self.segments.iter().filter(|s| s.merge_strategy == strategy).count()
    }
}

/// Dual-provider translation of segment batches
#[derive(Debug, Clone)]
pub struct TranslationOrchestrator {
    provider_a: TranslationProviderAdapter,
    provider_b: TranslationProviderAdapter,
    resolver: MergeResolver,
    group_size: usize,
}

impl TranslationOrchestrator {
    pub fn new(
        provider_a: TranslationProviderAdapter,
        provider_b: TranslationProviderAdapter,
        resolver: MergeResolver,
    ) -> Self {
        Self {
            provider_a,
            provider_b,
            resolver,
            group_size: 1,
        }
    }

    /// Segments in flight at once for `translate_batch_grouped`
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size.max(1);
        self
    }

    /// Build both adapters, the arbiter and the resolver from configuration
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let translation = &config.translation;
        let common = &translation.common;

        let provider_a = TranslationProviderAdapter::from_config(&translation.primary, common)?;
        let provider_b = TranslationProviderAdapter::from_config(&translation.secondary, common)?;

        let arbiter_config = translation.arbiter_provider();
        let arbiter = VerificationArbiter::new(build_provider(arbiter_config, common)?)
            .with_timeout(Duration::from_secs(arbiter_config.timeout_secs));
        let resolver = MergeResolver::with_policy(arbiter, config.merge);

        Ok(Self::new(provider_a, provider_b, resolver).with_group_size(common.segment_group_size))
    }

    pub fn provider_a(&self) -> &TranslationProviderAdapter {
        &self.provider_a
    }

    pub fn provider_b(&self) -> &TranslationProviderAdapter {
        &self.provider_b
    }

    /// Translate segments one after another
    pub async fn translate_batch(
        &self,
        segments: &[TranslationSegment],
        target_language: &str,
        context: Option<&TranslationContext>,
    ) -> Result<BatchTranslationResult, TranslationError> {
        self.translate_batch_with_progress(segments, target_language, context, |_, _| {})
            .await
    }

    /// Translate segments one after another, reporting `(done, total)` after each
    pub async fn translate_batch_with_progress<F>(
        &self,
        segments: &[TranslationSegment],
        target_language: &str,
        context: Option<&TranslationContext>,
        progress: F,
    ) -> Result<BatchTranslationResult, TranslationError>
    where
        F: Fn(usize, usize),
    {
        let (language, system_prompt) = self.prepare(segments, target_language, context)?;
        let total = segments.len();

        let mut merged = Vec::with_capacity(total);
        for segment in segments {
            merged.push(self.translate_segment(segment, language, &system_prompt).await?);
            progress(merged.len(), total);
        }

        Ok(self.finish(language, merged))
    }

    /// Translate with up to the configured group size of segments in flight
    pub async fn translate_batch_grouped<F>(
        &self,
        segments: &[TranslationSegment],
        target_language: &str,
        context: Option<&TranslationContext>,
        progress: F,
    ) -> Result<BatchTranslationResult, TranslationError>
    where
        F: Fn(usize, usize),
    {
        let (language, system_prompt) = self.prepare(segments, target_language, context)?;
        let system_prompt = system_prompt.as_str();
        let total = segments.len();

        // `buffered` yields in input order
        let mut results = pin!(
            stream::iter(segments)
                .map(|segment| self.translate_segment(segment, language, system_prompt))
                .buffered(self.group_size)
        );

        let mut merged = Vec::with_capacity(total);
        while let Some(result) = results.next().await {
            merged.push(result?);
            progress(merged.len(), total);
        }

        Ok(self.finish(language, merged))
    }

    /// Resolve the language, validate every segment and build the shared prompt
    fn prepare(
        &self,
        segments: &[TranslationSegment],
        target_language: &str,
        context: Option<&TranslationContext>,
    ) -> Result<(&'static SupportedLanguage, String), TranslationError> {
        let language =
            resolve_language(target_language).map_err(|e| TranslationError::InvalidInput(e.to_string()))?;

        for segment in segments {
            segment.validate()?;
        }

        info!(
            "Translating {} segments into {} with {} and {}",
            segments.len(),
            language.display_name,
            self.provider_a.label(),
            self.provider_b.label()
        );

        let default_context = TranslationContext::default();
        let system_prompt = build_system_prompt(context.unwrap_or(&default_context), language.display_name);

        Ok((language, system_prompt))
    }

    async fn translate_segment(
        &self,
        segment: &TranslationSegment,
        language: &SupportedLanguage,
        system_prompt: &str,
    ) -> Result<MergedTranslation, TranslationError> {
        let (result_a, result_b) = tokio::join!(
            self.provider_a.translate(segment, language, system_prompt),
            self.provider_b.translate(segment, language, system_prompt)
        );

        let result_a = result_a.map_err(|e| self.call_failure(segment, &self.provider_a, e))?;
        let result_b = result_b.map_err(|e| self.call_failure(segment, &self.provider_b, e))?;

        Ok(self.resolver.merge(segment, result_a, result_b, language).await)
    }

    fn call_failure(
        &self,
        segment: &TranslationSegment,
        adapter: &TranslationProviderAdapter,
        source: ProviderError,
    ) -> TranslationError {
        error!("Provider {} failed on segment {}: {}", adapter.label(), segment.id, source);
        TranslationError::ProviderCallFailure {
            segment_id: segment.id,
            provider: adapter.label().to_string(),
            source,
        }
    }

    fn finish(&self, language: &SupportedLanguage, merged: Vec<MergedTranslation>) -> BatchTranslationResult {
        let result = BatchTranslationResult::from_segments(language, merged);
        info!(
            "Batch complete: {} segments, overall confidence {:.2}, {} flagged, {} tokens",
            result.segments.len(),
            result.overall_confidence,
            result.count_by_strategy(MergeStrategy::LowAgreementFlagged),
            result.usage.total_tokens()
        );
        result
    }
}
