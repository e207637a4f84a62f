/*!
 * Merge resolver: turns two candidate translations into one.
 *
 * The agreement score between the candidates selects one of three regimes.
 * Each regime fixes the chosen text and the confidence reported downstream:
 *
 * | regime                | agreement        | text             | confidence |
 * |-----------------------|------------------|------------------|------------|
 * | high_agreement        | s >= 0.90        | provider A       | 0.95       |
 * | verified_selection    | 0.70 < s < 0.90  | arbiter's choice | 0.85       |
 * | low_agreement_flagged | s <= 0.70        | provider A       | 0.70       |
 *
 * When arbitration fails inside the verified band, provider A is kept at
 * 0.75 and the result is marked as an arbiter fallback.
 */

use anyhow::{anyhow, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::language_utils::SupportedLanguage;
use crate::translation::adapter::ProviderTranslationResult;
use crate::translation::arbiter::{Verdict, VerificationArbiter};
use crate::translation::segment::TranslationSegment;
use crate::translation::similarity::jaccard_similarity;

/// Scores at or above this are high agreement
pub const HIGH_AGREEMENT_THRESHOLD: f64 = 0.90;
/// Scores at or below this are low agreement
pub const LOW_AGREEMENT_THRESHOLD: f64 = 0.70;

pub const HIGH_AGREEMENT_CONFIDENCE: f64 = 0.95;
pub const VERIFIED_SELECTION_CONFIDENCE: f64 = 0.85;
pub const ARBITER_FALLBACK_CONFIDENCE: f64 = 0.75;
pub const LOW_AGREEMENT_CONFIDENCE: f64 = 0.70;

/// Disagreement-handling regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    HighAgreement,
    VerifiedSelection,
    LowAgreementFlagged,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighAgreement => "high_agreement",
            Self::VerifiedSelection => "verified_selection",
            Self::LowAgreementFlagged => "low_agreement_flagged",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Regime thresholds and the confidence each regime reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergePolicy {
    pub high_agreement_threshold: f64,
    pub low_agreement_threshold: f64,
    pub high_agreement_confidence: f64,
    pub verified_selection_confidence: f64,
    pub arbiter_fallback_confidence: f64,
    pub low_agreement_confidence: f64,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            high_agreement_threshold: HIGH_AGREEMENT_THRESHOLD,
            low_agreement_threshold: LOW_AGREEMENT_THRESHOLD,
            high_agreement_confidence: HIGH_AGREEMENT_CONFIDENCE,
            verified_selection_confidence: VERIFIED_SELECTION_CONFIDENCE,
            arbiter_fallback_confidence: ARBITER_FALLBACK_CONFIDENCE,
            low_agreement_confidence: LOW_AGREEMENT_CONFIDENCE,
        }
    }
}

impl MergePolicy {
    /// Regime for an agreement score
    pub fn strategy_for(&self, agreement_score: f64) -> MergeStrategy {
        if agreement_score >= self.high_agreement_threshold {
            MergeStrategy::HighAgreement
        } else if agreement_score > self.low_agreement_threshold {
            MergeStrategy::VerifiedSelection
        } else {
            MergeStrategy::LowAgreementFlagged
        }
    }

    /// Confidence reported by a regime when it completes normally
    pub fn confidence_for(&self, strategy: MergeStrategy) -> f64 {
        match strategy {
            MergeStrategy::HighAgreement => self.high_agreement_confidence,
            MergeStrategy::VerifiedSelection => self.verified_selection_confidence,
            MergeStrategy::LowAgreementFlagged => self.low_agreement_confidence,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            ("high_agreement_threshold", self.high_agreement_threshold),
            ("low_agreement_threshold", self.low_agreement_threshold),
            ("high_agreement_confidence", self.high_agreement_confidence),
            ("verified_selection_confidence", self.verified_selection_confidence),
            ("arbiter_fallback_confidence", self.arbiter_fallback_confidence),
            ("low_agreement_confidence", self.low_agreement_confidence),
        ];
        for (name, value) in values {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("merge.{} must be between 0 and 1, got {}", name, value));
            }
        }

        if self.low_agreement_threshold >= self.high_agreement_threshold {
            return Err(anyhow!(
                "merge.low_agreement_threshold ({}) must be below merge.high_agreement_threshold ({})",
                self.low_agreement_threshold,
                self.high_agreement_threshold
            ));
        }

        Ok(())
    }
}

/// Both candidates, kept for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResults {
    pub a: ProviderTranslationResult,
    pub b: ProviderTranslationResult,
}

/// Final translation of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedTranslation {
    pub segment_id: u32,
    pub text: String,
    pub confidence: f64,
    /// Label of the provider whose text was kept
    pub primary_model: String,
    pub agreement_score: f64,
    pub merge_strategy: MergeStrategy,
    /// Set when arbitration failed and provider A was kept
    #[serde(default)]
    pub arbiter_fallback: bool,
    pub provider_results: ProviderResults,
}

/// Deterministic merge of two candidate translations
#[derive(Debug, Clone)]
pub struct MergeResolver {
    arbiter: VerificationArbiter,
    policy: MergePolicy,
}

impl MergeResolver {
    pub fn new(arbiter: VerificationArbiter) -> Self {
        Self::with_policy(arbiter, MergePolicy::default())
    }

    pub fn with_policy(arbiter: VerificationArbiter, policy: MergePolicy) -> Self {
        Self { arbiter, policy }
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    /// Merge the candidates of provider A and provider B for one segment.
    ///
    /// Never fails: arbitration errors fall back to provider A.
    pub async fn merge(
        &self,
        segment: &TranslationSegment,
        result_a: ProviderTranslationResult,
        result_b: ProviderTranslationResult,
        language: &SupportedLanguage,
    ) -> MergedTranslation {
        let agreement_score = jaccard_similarity(&result_a.translated_text, &result_b.translated_text);
        let merge_strategy = self.policy.strategy_for(agreement_score);
        let mut confidence = self.policy.confidence_for(merge_strategy);
        let mut arbiter_fallback = false;

        let pick_b = match merge_strategy {
            MergeStrategy::HighAgreement => false,
            MergeStrategy::LowAgreementFlagged => {
                warn!(
                    "Segment {} flagged for review: agreement {:.2} between {} and {}",
                    segment.id, agreement_score, result_a.model, result_b.model
                );
                false
            }
            MergeStrategy::VerifiedSelection => {
                match self
                    .arbiter
                    .choose(&segment.text, &result_a.translated_text, &result_b.translated_text, language)
                    .await
                {
                    Ok(verdict) => verdict == Verdict::B,
                    Err(e) => {
                        warn!(
                            "Arbitration failed for segment {}, keeping {}: {}",
                            segment.id, result_a.model, e
                        );
                        confidence = self.policy.arbiter_fallback_confidence;
                        arbiter_fallback = true;
                        false
                    }
                }
            }
        };

        let chosen = if pick_b { &result_b } else { &result_a };
        let text = chosen.translated_text.clone();
        let primary_model = chosen.model.clone();

        debug!(
            "Segment {}: {} (agreement {:.2}, confidence {:.2}, model {})",
            segment.id, merge_strategy, agreement_score, confidence, primary_model
        );

        MergedTranslation {
            segment_id: segment.id,
            text,
            confidence,
            primary_model,
            agreement_score,
            merge_strategy,
            arbiter_fallback,
            provider_results: ProviderResults { a: result_a, b: result_b },
        }
    }
}
