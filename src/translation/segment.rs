/*!
 * Input types of the translation stage.
 *
 * A `TranslationSegment` is one time-bounded span of transcript text handed
 * over by the transcription stage. A `TranslationContext` describes who is
 * speaking and how, and is shared by every segment of a batch.
 */

use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;

/// One transcript span to translate as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationSegment {
    /// Segment identifier assigned by the transcription stage
    pub id: u32,
    /// Source-language text
    pub text: String,
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
}

impl TranslationSegment {
    /// Create a new segment
    pub fn new(id: u32, text: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            id,
            text: text.into(),
            start_time,
            end_time,
        }
    }

    /// Spoken duration of the source audio
    pub fn duration_secs(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Reject segments no provider should ever see
    pub fn validate(&self) -> Result<(), TranslationError> {
        if self.text.trim().is_empty() {
            return Err(TranslationError::InvalidInput(format!(
                "segment {} has no text",
                self.id
            )));
        }
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(TranslationError::InvalidInput(format!(
                "segment {} has non-finite time bounds",
                self.id
            )));
        }
        if self.start_time < 0.0 {
            return Err(TranslationError::InvalidInput(format!(
                "segment {} starts before zero ({})",
                self.id, self.start_time
            )));
        }
        if self.end_time <= self.start_time {
            return Err(TranslationError::InvalidInput(format!(
                "segment {} ends at {} which is not after its start {}",
                self.id, self.end_time, self.start_time
            )));
        }
        Ok(())
    }
}

/// Speaker and register information for a translation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TranslationContext {
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
