/*!
 * Verification arbiter for the moderate-agreement band.
 *
 * One extra model call shows both candidates as "A" and "B" and asks which
 * one to keep. The reply must be exactly one of those letters.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{ArbitrationError, ProviderError};
use crate::language_utils::SupportedLanguage;
use crate::providers::{CompletionRequest, Provider};
use crate::translation::adapter::DEFAULT_CALL_TIMEOUT;
use crate::translation::prompts::build_arbiter_prompt;

/// Token budget for the one-letter verdict
const VERDICT_MAX_TOKENS: u32 = 1;

/// Candidate picked by the arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    A,
    B,
}

impl Verdict {
    /// Parse a raw reply; only a lone "A" or "B" (any case, any padding) counts
    pub fn parse(reply: &str) -> Result<Self, ArbitrationError> {
        match reply.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            other => Err(ArbitrationError::Unparseable(other.to_string())),
        }
    }
}

/// Picks between two candidate translations with one model call
#[derive(Debug, Clone)]
pub struct VerificationArbiter {
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

impl VerificationArbiter {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Ask which candidate better preserves the source
    pub async fn choose(
        &self,
        source_text: &str,
        candidate_a: &str,
        candidate_b: &str,
        language: &SupportedLanguage,
    ) -> Result<Verdict, ArbitrationError> {
        let prompt = build_arbiter_prompt(source_text, candidate_a, candidate_b, language.display_name);
        let request = CompletionRequest::new(prompt, VERDICT_MAX_TOKENS).temperature(0.0);

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| ProviderError::Timeout {
                millis: self.timeout.as_millis() as u64,
            })??;

        let verdict = Verdict::parse(&response.text)?;
        debug!("Arbiter {} chose {:?}", self.provider.model(), verdict);
        Ok(verdict)
    }
}
