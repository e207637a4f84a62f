/*!
 * # govdub - dual-model translation for dubbed government communications
 *
 * A Rust library that translates transcript segments into the languages a
 * municipal language-access program must serve, using two independent
 * language models and merging their candidates deterministically.
 *
 * ## Features
 *
 * - Translate segments using two AI providers side by side:
 *   - OpenAI API (also LM Studio through its OpenAI-compatible server)
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Agreement scoring between the two candidates
 * - Three merge regimes with calibrated confidences
 * - A/B verification call for moderate agreement
 * - QA routing and the hand-off to speech synthesis
 * - ISO 639-1 and ISO 639-2/3 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Dual-model translation:
 *   - `translation::prompts`: System prompt and per-segment instruction
 *   - `translation::adapter`: Uniform translation call over one provider
 *   - `translation::similarity`: Agreement scoring
 *   - `translation::merge`: Regime selection and merged output
 *   - `translation::arbiter`: A/B verification
 *   - `translation::orchestrator`: Batch driver
 * - `qa`: Review tiers and synthesis cues
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Supported language table
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scriptable provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod qa;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ArbitrationError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, resolve_language, supported_languages};
pub use qa::{QaReport, QaStatus, QaThresholds};
pub use translation::{
    BatchTranslationResult, MergeStrategy, MergedTranslation, TranslationContext, TranslationOrchestrator,
    TranslationSegment,
};
