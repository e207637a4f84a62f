/*!
 * Full app lifecycle: segment file in, batch and review out
 */

use govdub::app_config::{Config, ProviderConfig, TranslationProvider};
use govdub::app_controller::{Controller, TranslationOutput};
use govdub::file_utils::FileManager;
use govdub::providers::mock::MockProvider;
use govdub::translation::TranslationOrchestrator;

use crate::common;

fn local_config() -> Config {
    let mut config = Config::default();
    config.translation.primary = ProviderConfig::new(TranslationProvider::Ollama, 0.90);
    config.translation.secondary = ProviderConfig::new(TranslationProvider::LMStudio, 0.85);
    config
}

#[tokio::test]
async fn test_run_shouldWriteBatchAndReviewNextToInput() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_segments_file(dir.path(), "briefing.json").unwrap();
    let agreeing = common::echoing_provider("FR ");
    let orchestrator = common::mock_orchestrator(&agreeing, &agreeing, &MockProvider::replying("A"));
    let mut config = local_config();
    config.target_language = "fra".to_string();
    let controller = Controller::with_orchestrator(config, orchestrator);

    let output_path = controller.run(&input, None, None, false).await.unwrap();

    assert_eq!(output_path, dir.path().join("briefing.fr.json"));
    let output: TranslationOutput = FileManager::read_json(&output_path).unwrap();
    assert_eq!(output.batch.segments.len(), 3);
    assert_eq!(output.batch.target_language, "fr");
    assert_eq!(output.review.synthesis_cues().len(), 3);
    assert_eq!(output.review.items[1].text, "FR We will invest fifty million dollars in new housing.");

    let raw = FileManager::read_to_string(&output_path).unwrap();
    assert!(raw.contains("\"mergeStrategy\": \"high_agreement\""));
    assert!(raw.contains("\"overallConfidence\""));
}

#[tokio::test]
async fn test_run_grouped_withExplicitOutput_shouldWriteThere() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_segments_file(dir.path(), "segments.json").unwrap();
    let output = dir.path().join("out").join("result.json");
    let orchestrator = common::mock_orchestrator(
        &MockProvider::replying("Hola"),
        &MockProvider::replying("Adiós"),
        &MockProvider::replying("A"),
    )
    .with_group_size(2);
    let controller = Controller::with_orchestrator(local_config(), orchestrator);

    let written = controller.run(&input, Some(output.clone()), None, true).await.unwrap();

    assert_eq!(written, output);
    let result: TranslationOutput = FileManager::read_json(&output).unwrap();
    assert_eq!(result.review.summary().flagged, 3);
    assert!(result.review.synthesis_cues().is_empty());
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let controller = Controller::with_orchestrator(
        local_config(),
        common::mock_orchestrator(&MockProvider::working(), &MockProvider::working(), &MockProvider::replying("A")),
    );

    let result = controller.run(&dir.path().join("missing.json"), None, None, false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_withProviderFailure_shouldNotWriteOutput() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_segments_file(dir.path(), "segments.json").unwrap();
    let controller = Controller::with_orchestrator(
        local_config(),
        common::mock_orchestrator(&MockProvider::working(), &MockProvider::failing(), &MockProvider::replying("A")),
    );

    let err = controller.run(&input, None, None, false).await.unwrap_err();

    assert!(err.to_string().contains("segment 1"));
    assert!(!dir.path().join("segments.es.json").exists());
}

#[test]
fn test_withConfig_withLocalProviders_shouldBuildOrchestrator() {
    let config = local_config();
    assert!(Controller::with_config(config.clone()).is_ok());

    let orchestrator = TranslationOrchestrator::from_config(&config).unwrap();
    assert_eq!(orchestrator.provider_a().label(), "llama3.1");
    assert_eq!(orchestrator.provider_b().label(), "local-model");
    assert_eq!(orchestrator.provider_b().prior_confidence(), 0.85);
}

#[test]
fn test_withConfig_withBadLanguage_shouldFail() {
    let mut config = local_config();
    config.target_language = "de".to_string();
    assert!(Controller::with_config(config).is_err());
}
