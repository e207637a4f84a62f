/*!
 * QA routing between translation and speech synthesis.
 *
 * Every merged segment lands in one of three review tiers by confidence.
 * Reviewers can approve a segment, optionally replacing its text, and only
 * approved segments are handed to synthesis.
 */

use anyhow::{anyhow, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::TranslationError;
use crate::translation::merge::MergeStrategy;
use crate::translation::orchestrator::BatchTranslationResult;
use crate::translation::segment::TranslationSegment;

/// Confidence thresholds for review tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaThresholds {
    /// Minimum confidence for automatic approval (default: 0.90)
    pub approve: f64,

    /// Minimum confidence to avoid being flagged (default: 0.80)
    pub review: f64,
}

impl Default for QaThresholds {
    fn default() -> Self {
        Self {
            approve: 0.90,
            review: 0.80,
        }
    }
}

impl QaThresholds {
    /// Tier for a confidence value
    pub fn status_for(&self, confidence: f64) -> QaStatus {
        if confidence >= self.approve {
            QaStatus::Approved
        } else if confidence >= self.review {
            QaStatus::NeedsReview
        } else {
            QaStatus::Flagged
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.approve) || !(0.0..=1.0).contains(&self.review) {
            return Err(anyhow!("qa thresholds must be between 0 and 1"));
        }
        if self.review > self.approve {
            return Err(anyhow!(
                "qa.review ({}) must not exceed qa.approve ({})",
                self.review,
                self.approve
            ));
        }
        Ok(())
    }
}

/// Review tier of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaStatus {
    Approved,
    NeedsReview,
    Flagged,
}

/// One segment as presented to a reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaReviewItem {
    pub segment_id: u32,
    pub status: QaStatus,
    pub confidence: f64,
    pub strategy: MergeStrategy,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub human_approved: bool,
}

/// Counts per tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaSummary {
    pub total: usize,
    pub approved: usize,
    pub needs_review: usize,
    pub flagged: usize,
    pub human_approved: usize,
}

/// Text and timing handed to speech synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisCue {
    pub segment_id: u32,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Review state of a translated batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaReport {
    pub target_language: String,
    pub items: Vec<QaReviewItem>,
}

impl QaReport {
    /// Route every merged segment into its tier, pairing it with its source timing
    pub fn from_batch(
        segments: &[TranslationSegment],
        batch: &BatchTranslationResult,
        thresholds: &QaThresholds,
    ) -> Self {
        let timings: HashMap<u32, (f64, f64)> =
            segments.iter().map(|s| (s.id, (s.start_time, s.end_time))).collect();

        let items = batch
            .segments
            .iter()
            .map(|merged| {
                let (start_time, end_time) = timings.get(&merged.segment_id).copied().unwrap_or_else(|| {
                    warn!("No source timing for segment {}", merged.segment_id);
                    (0.0, 0.0)
                });

                QaReviewItem {
                    segment_id: merged.segment_id,
                    status: thresholds.status_for(merged.confidence),
                    confidence: merged.confidence,
                    strategy: merged.merge_strategy,
                    text: merged.text.clone(),
                    start_time,
                    end_time,
                    human_approved: false,
                }
            })
            .collect();

        let report = Self {
            target_language: batch.target_language.clone(),
            items,
        };
        let summary = report.summary();
        info!(
            "QA routing: {} approved, {} need review, {} flagged",
            summary.approved, summary.needs_review, summary.flagged
        );
        report
    }

    pub fn summary(&self) -> QaSummary {
        let mut summary = QaSummary {
            total: self.items.len(),
            ..QaSummary::default()
        };
        for item in &self.items {
            match item.status {
                QaStatus::Approved => summary.approved += 1,
                QaStatus::NeedsReview => summary.needs_review += 1,
                QaStatus::Flagged => summary.flagged += 1,
            }
            if item.human_approved {
                summary.human_approved += 1;
            }
        }
        summary
    }

    /// Items still waiting for a reviewer
    pub fn pending(&self) -> impl Iterator<Item = &QaReviewItem> {
        self.items.iter().filter(|item| item.status != QaStatus::Approved)
    }

    /// Record a reviewer's approval, optionally replacing the text
    pub fn approve(&mut self, segment_id: u32, edited_text: Option<&str>) -> Result<(), TranslationError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.segment_id == segment_id)
            .ok_or_else(|| TranslationError::InvalidInput(format!("no segment {} in review", segment_id)))?;

        if let Some(text) = edited_text {
            let text = text.trim();
            if text.is_empty() {
                return Err(TranslationError::InvalidInput(format!(
                    "edited text for segment {} is empty",
                    segment_id
                )));
            }
            item.text = text.to_string();
        }

        item.status = QaStatus::Approved;
        item.human_approved = true;
        Ok(())
    }

    /// Approved segments in order, ready for speech synthesis
    pub fn synthesis_cues(&self) -> Vec<SynthesisCue> {
        self.items
            .iter()
            .filter(|item| item.status == QaStatus::Approved)
            .map(|item| SynthesisCue {
                segment_id: item.segment_id,
                text: item.text.clone(),
                start_time: item.start_time,
                end_time: item.end_time,
            })
            .collect()
    }
}
