use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::providers::build_provider;
use crate::qa::QaReport;
use crate::translation::{BatchTranslationResult, TranslationContext, TranslationOrchestrator, TranslationSegment};

// @module: Application controller for batch translation

/// Everything written for one translated batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOutput {
    pub batch: BatchTranslationResult,
    pub review: QaReport,
}

/// Outcome of a backend connection check
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    pub role: &'static str,
    pub provider: String,
    pub model: String,
    pub error: Option<String>,
}

/// Main application controller for dubbing translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Pre-built orchestrator, otherwise built from config on demand
    orchestrator: Option<TranslationOrchestrator>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self {
            config,
            orchestrator: None,
        })
    }

    /// Use an already assembled orchestrator instead of the configured backends
    pub fn with_orchestrator(config: Config, orchestrator: TranslationOrchestrator) -> Self {
        Self {
            config,
            orchestrator: Some(orchestrator),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn orchestrator(&self) -> Result<TranslationOrchestrator> {
        match &self.orchestrator {
            Some(orchestrator) => Ok(orchestrator.clone()),
            None => TranslationOrchestrator::from_config(&self.config)
                .map_err(|e| anyhow!("Failed to initialize translation providers: {}", e)),
        }
    }

    // @reads: Segment list from a JSON array file
    pub fn load_segments(path: &Path) -> Result<Vec<TranslationSegment>> {
        let segments: Vec<TranslationSegment> = FileManager::read_json(path)?;
        info!("Loaded {} segments from {}", segments.len(), path.display());
        Ok(segments)
    }

    /// Translate a segment file and write `{batch, review}` as JSON
    pub async fn run(
        &self,
        input_file: &Path,
        output_file: Option<PathBuf>,
        context: Option<&TranslationContext>,
        grouped: bool,
    ) -> Result<PathBuf> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {}", input_file.display()));
        }

        let segments = Self::load_segments(input_file)?;
        let output = self.translate(&segments, context, grouped).await?;

        let output_path = output_file
            .unwrap_or_else(|| FileManager::generate_output_path(input_file, &output.batch.target_language));
        FileManager::write_json(&output_path, &output)?;

        let summary = output.review.summary();
        info!(
            "Wrote {} ({} approved, {} need review, {} flagged)",
            output_path.display(),
            summary.approved,
            summary.needs_review,
            summary.flagged
        );

        Ok(output_path)
    }

    /// Translate already-loaded segments with a progress bar
    pub async fn translate(
        &self,
        segments: &[TranslationSegment],
        context: Option<&TranslationContext>,
        grouped: bool,
    ) -> Result<TranslationOutput> {
        let orchestrator = self.orchestrator()?;
        let target_language = self.config.target_language.as_str();

        let progress_bar = ProgressBar::new(segments.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        info!(
            "🚀 govdub: {} + {} into {}",
            orchestrator.provider_a().label(),
            orchestrator.provider_b().label(),
            target_language
        );

        let update = |done: usize, _total: usize| progress_bar.set_position(done as u64);
        let result = if grouped {
            orchestrator
                .translate_batch_grouped(segments, target_language, context, update)
                .await
        } else {
            orchestrator
                .translate_batch_with_progress(segments, target_language, context, update)
                .await
        };

        let batch = match result {
            Ok(batch) => {
                progress_bar.finish_with_message("Done");
                batch
            }
            Err(e) => {
                progress_bar.abandon_with_message("Failed");
                error!("Translation aborted: {}", e);
                return Err(e.into());
            }
        };

        let review = QaReport::from_batch(segments, &batch, &self.config.qa);
        Ok(TranslationOutput { batch, review })
    }

    /// Test the connection to every configured backend
    pub async fn check_connections(&self) -> Vec<ConnectionStatus> {
        let translation = &self.config.translation;
        let mut statuses = Vec::new();

        for (role, provider_config) in [("primary", &translation.primary), ("secondary", &translation.secondary)] {
            let model = provider_config.model_or_default();
            let error = match build_provider(provider_config, &translation.common) {
                Ok(provider) => provider.test_connection().await.err().map(|e| e.to_string()),
                Err(e) => Some(e.to_string()),
            };

            statuses.push(ConnectionStatus {
                role,
                provider: provider_config.provider_type.display_name().to_string(),
                model,
                error,
            });
        }

        statuses
    }
}
