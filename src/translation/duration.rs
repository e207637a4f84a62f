/*!
 * Spoken-duration estimates for translated text.
 *
 * Estimates are informational metadata attached to provider results; they
 * never gate whether a translation is accepted.
 */

use crate::language_utils::SupportedLanguage;

/// Whitespace-delimited word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Seconds needed to speak `text` at `words_per_minute`
pub fn estimate_duration_secs(text: &str, words_per_minute: u32) -> f64 {
    if words_per_minute == 0 {
        return 0.0;
    }
    word_count(text) as f64 / words_per_minute as f64 * 60.0
}

/// Estimate using the language's speaking rate
pub fn estimate_for_language(text: &str, language: &SupportedLanguage) -> f64 {
    estimate_duration_secs(text, language.words_per_minute)
}

/// Estimated duration over available duration; above 1.0 the dub runs long
pub fn pacing_ratio(estimated_secs: f64, available_secs: f64) -> f64 {
    if available_secs <= 0.0 {
        return 0.0;
    }
    estimated_secs / available_secs
}
