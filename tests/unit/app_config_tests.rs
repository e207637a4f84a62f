/*!
 * Tests for configuration loading and validation
 */

use govdub::app_config::{ArbiterChoice, Config, LogLevel, ProviderConfig, TranslationProvider};

use crate::common;

fn local_config() -> Config {
    let mut config = Config::default();
    config.translation.primary = ProviderConfig::new(TranslationProvider::Ollama, 0.90);
    config.translation.secondary = ProviderConfig::new(TranslationProvider::LMStudio, 0.85);
    config
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.target_language, "es");
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.translation.primary.model, config.translation.primary.model);
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "target_language": "ht",
            "translation": {
                "primary": { "type": "ollama", "prior_confidence": 0.9 },
                "secondary": { "type": "lmstudio", "model": "aya-23", "prior_confidence": 0.85 },
                "arbiter": "secondary"
            },
            "merge": { "low_agreement_threshold": 0.6 },
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.target_language, "ht");
    assert_eq!(config.translation.secondary.model, "aya-23");
    assert_eq!(config.translation.primary.model_or_default(), "llama3.1");
    assert_eq!(config.translation.arbiter, ArbiterChoice::Secondary);
    assert_eq!(config.merge.low_agreement_threshold, 0.6);
    assert_eq!(config.merge.high_agreement_threshold, 0.90);
    assert_eq!(config.qa.approve, 0.90);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrCreate_withoutPriorConfidence_shouldDefaultByRole() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "translation": {
                "primary": { "type": "ollama" },
                "secondary": { "type": "lmstudio", "model": "aya-23" }
            }
        }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.translation.primary.prior_confidence, 0.90);
    assert_eq!(config.translation.secondary.prior_confidence, 0.85);
    assert_eq!(config.translation.secondary.model, "aya-23");
}

#[test]
fn test_loadOrCreate_withMalformedFile_shouldReportPath() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    let err = Config::load_or_create(&path).unwrap_err();
    assert!(err.to_string().contains("conf.json"));
}

#[test]
fn test_validate_withInvertedMergeThresholds_shouldFail() {
    let mut config = local_config();
    config.merge.low_agreement_threshold = 0.95;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withInvertedQaThresholds_shouldFail() {
    let mut config = local_config();
    config.qa.review = 0.95;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroGroupSize_shouldFail() {
    let mut config = local_config();
    config.translation.common.segment_group_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_providerConfig_withExplicitKey_shouldPreferIt() {
    let mut provider = ProviderConfig::new(TranslationProvider::OpenAI, 0.9);
    provider.api_key = "sk-configured".to_string();
    assert_eq!(provider.resolved_api_key(), "sk-configured");
}
