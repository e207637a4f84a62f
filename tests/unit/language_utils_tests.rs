/*!
 * Tests for the supported language table
 */

use govdub::errors::TranslationError;
use govdub::language_utils::{get_language_name, is_supported, normalize_to_part1, resolve_language, supported_languages};

#[test]
fn test_supportedLanguages_shouldListTheTenMandatedLanguagesInOrder() {
    let codes: Vec<String> = supported_languages().into_iter().map(|l| l.code).collect();
    assert_eq!(codes, vec!["es", "zh", "ru", "bn", "ht", "ko", "ar", "ur", "fr", "pl"]);
}

#[test]
fn test_supportedLanguages_shouldSerializeDisplayNameInCamelCase() {
    let json = serde_json::to_value(supported_languages()).unwrap();
    assert_eq!(json[1]["code"], "zh");
    assert_eq!(json[1]["displayName"], "Chinese (Mandarin)");
    assert_eq!(json[4]["displayName"], "Haitian Creole");
}

#[test]
fn test_resolveLanguage_shouldAcceptThreeLetterCodes() {
    assert_eq!(resolve_language("spa").unwrap().code, "es");
    assert_eq!(resolve_language("zho").unwrap().code, "zh");
    assert_eq!(resolve_language("chi").unwrap().code, "zh");
    assert_eq!(resolve_language("fre").unwrap().code, "fr");
    assert_eq!(resolve_language("hat").unwrap().code, "ht");
}

#[test]
fn test_resolveLanguage_shouldIgnoreCaseSpacingAndRegion() {
    assert_eq!(resolve_language(" KO ").unwrap().code, "ko");
    assert_eq!(resolve_language("zh-CN").unwrap().code, "zh");
    assert_eq!(resolve_language("fr_CA").unwrap().code, "fr");
}

#[test]
fn test_resolveLanguage_withLanguageOutsideTable_shouldFail() {
    for code in ["de", "en", "pt-BR", "xx", ""] {
        assert!(
            matches!(resolve_language(code), Err(TranslationError::UnsupportedLanguage(_))),
            "accepted {:?}",
            code
        );
        assert!(!is_supported(code));
    }
}

#[test]
fn test_getLanguageName_shouldReturnDisplayName() {
    assert_eq!(get_language_name("bn").unwrap(), "Bengali");
    assert_eq!(get_language_name("urd").unwrap(), "Urdu");
}

#[test]
fn test_normalizeToPart1_shouldHandleUnknownCodes() {
    assert_eq!(normalize_to_part1("pol").as_deref(), Some("pl"));
    assert_eq!(normalize_to_part1("123"), None);
    assert_eq!(normalize_to_part1("english"), None);
}
