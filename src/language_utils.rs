use isolang::Language;
use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;

/// Language utilities for the fixed target-language table
///
/// The platform translates into exactly ten languages mandated by the local
/// language-access policy it serves. Codes are accepted as ISO 639-1 or
/// ISO 639-2/3 and normalized with `isolang` before lookup.
/// A supported target language with its speech pacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportedLanguage {
    /// ISO 639-1 code
    pub code: &'static str,
    /// Name shown to users and used inside prompts
    pub display_name: &'static str,
    /// Typical speaking rate, used for duration estimates
    pub words_per_minute: u32,
}

/// Public `{code, displayName}` pair returned by the language query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub code: String,
    pub display_name: String,
}

/// Table order is the order the query operation returns.
pub const SUPPORTED_LANGUAGES: [SupportedLanguage; 10] = [
    SupportedLanguage { code: "es", display_name: "Spanish", words_per_minute: 160 },
    SupportedLanguage { code: "zh", display_name: "Chinese (Mandarin)", words_per_minute: 140 },
    SupportedLanguage { code: "ru", display_name: "Russian", words_per_minute: 130 },
    SupportedLanguage { code: "bn", display_name: "Bengali", words_per_minute: 140 },
    SupportedLanguage { code: "ht", display_name: "Haitian Creole", words_per_minute: 150 },
    SupportedLanguage { code: "ko", display_name: "Korean", words_per_minute: 140 },
    SupportedLanguage { code: "ar", display_name: "Arabic", words_per_minute: 130 },
    SupportedLanguage { code: "ur", display_name: "Urdu", words_per_minute: 140 },
    SupportedLanguage { code: "fr", display_name: "French", words_per_minute: 155 },
    SupportedLanguage { code: "pl", display_name: "Polish", words_per_minute: 130 },
];

/// List the supported target languages as `{code, displayName}` pairs
pub fn supported_languages() -> Vec<LanguageInfo> {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|lang| LanguageInfo {
            code: lang.code.to_string(),
            display_name: lang.display_name.to_string(),
        })
        .collect()
}

/// Normalize a language code to ISO 639-1 (2-letter) format
///
/// Trims, lower-cases and drops a region suffix (`zh-CN`, `pt_BR`) before
/// consulting `isolang`. Returns `None` for unknown codes.
pub fn normalize_to_part1(code: &str) -> Option<String> {
    let normalized_code = code.trim().to_lowercase();
    let base = normalized_code
        .split(['-', '_'])
        .next()
        .unwrap_or_default();

    let language = match base.len() {
        2 => Language::from_639_1(base),
        3 => Language::from_639_3(base).or_else(|| part2b_to_language(base)),
        _ => None,
    }?;

    language.to_639_1().map(|c| c.to_string())
}

/// ISO 639-2/B codes that differ from their 639-2/T form
fn part2b_to_language(code: &str) -> Option<Language> {
    let part2t = match code {
        "chi" => "zho",
        "fre" => "fra",
        "per" => "fas",
        _ => return None,
    };
    Language::from_639_3(part2t)
}

/// Resolve a caller-supplied code against the supported table
pub fn resolve_language(code: &str) -> Result<&'static SupportedLanguage, TranslationError> {
    let part1 = normalize_to_part1(code)
        .ok_or_else(|| TranslationError::UnsupportedLanguage(code.trim().to_string()))?;

    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| lang.code == part1)
        .ok_or_else(|| TranslationError::UnsupportedLanguage(code.trim().to_string()))
}

/// Whether a code resolves to a supported language
pub fn is_supported(code: &str) -> bool {
    resolve_language(code).is_ok()
}

/// Get the display name for a supported language code
pub fn get_language_name(code: &str) -> Result<&'static str, TranslationError> {
    resolve_language(code).map(|lang| lang.display_name)
}
