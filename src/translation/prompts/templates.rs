/*!
 * Prompt templates for government-communication translation.
 *
 * The system prompt is rendered once per batch from a `TranslationContext`
 * and sent verbatim to both providers. The segment instruction is the user
 * message of each call.
 */

use once_cell::sync::Lazy;

use crate::translation::segment::{TranslationContext, TranslationSegment};

/// Speaker used when the context names none
pub const DEFAULT_SPEAKER: &str = "Government Official";

/// Tone used when the context names none
pub const DEFAULT_TONE: &str = "Formal, authoritative, and informative";

/// Domain used when the context names none
pub const DEFAULT_DOMAIN: &str = "Government public communications";

/// Description used when the context names none
pub const DEFAULT_DESCRIPTION: &str = "Official public announcement";

/// System prompt template for translation calls.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for government communications.
    pub const GOVERNMENT_TRANSLATOR: &'static str = r#"You are a professional translator for government communications, translating English into {target_language} for dubbed public video.

## Context
- Speaker: {speaker}
- Tone: {tone}
- Domain: {domain}
- Content: {description}

## Requirements
1. Maintain the formal, official tone appropriate for government communications
2. Preserve technical terms, numbers, dates, and proper nouns exactly
3. Ensure the translation is culturally appropriate for {target_language} speakers
4. Keep the translation length within 10% of the original so the dubbed audio stays in sync
5. Use the standard, widely understood dialect of {target_language}
6. Preserve the authority and credibility of the original message
7. Do not add explanations, notes, or commentary

## Caveats
- Names of agencies, programs, and officials must be kept or transliterated consistently
- Safety-critical content (emergency instructions, dates, phone numbers, addresses) must be rendered exactly"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default government translator template.
    pub fn government_translator() -> Self {
        Self::new(Self::GOVERNMENT_TRANSLATOR)
    }

    /// Render the template, filling absent context fields with defaults.
    pub fn render(&self, context: &TranslationContext, target_language: &str) -> String {
        self.template
            .replace("{target_language}", target_language)
            .replace("{speaker}", context.speaker.as_deref().unwrap_or(DEFAULT_SPEAKER))
            .replace("{tone}", context.tone.as_deref().unwrap_or(DEFAULT_TONE))
            .replace("{domain}", context.domain.as_deref().unwrap_or(DEFAULT_DOMAIN))
            .replace(
                "{description}",
                context.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION),
            )
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::government_translator()
    }
}

static GOVERNMENT_TEMPLATE: Lazy<PromptTemplate> = Lazy::new(PromptTemplate::government_translator);

/// Build the system prompt shared by both providers for a batch.
pub fn build_system_prompt(context: &TranslationContext, target_language_name: &str) -> String {
    GOVERNMENT_TEMPLATE.render(context, target_language_name)
}

/// Build the per-segment user message.
pub fn build_segment_instruction(segment: &TranslationSegment, target_language_name: &str) -> String {
    format!(
        "Translate the following segment into {}. It is spoken over {:.1} seconds; \
         keep a similar spoken length.\n\nSource text: \"{}\"\n\n\
         Return only the translation, with no explanation.",
        target_language_name,
        segment.duration_secs(),
        segment.text
    )
}

/// Build the verification prompt comparing two candidate translations.
pub fn build_arbiter_prompt(
    source_text: &str,
    candidate_a: &str,
    candidate_b: &str,
    target_language_name: &str,
) -> String {
    format!(
        "Two {lang} translations of the same government announcement segment follow.\n\n\
         Original (English): \"{source}\"\n\n\
         A: \"{a}\"\n\
         B: \"{b}\"\n\n\
         Which translation better preserves the meaning, reads naturally, keeps the \
         formal register, and matches the original length? Answer with a single letter: A or B.",
        lang = target_language_name,
        source = source_text,
        a = candidate_a,
        b = candidate_b,
    )
}
