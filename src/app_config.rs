use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::qa::QaThresholds;
use crate::translation::merge::MergePolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Merge thresholds and regime confidences
    #[serde(default)]
    pub merge: MergePolicy,

    /// QA routing thresholds
    #[serde(default)]
    pub qa: QaThresholds,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    #[default]
    OpenAI,
    Anthropic,
    Ollama,
    /// LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Whether requests must carry an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }

    /// Environment variable consulted when no key is configured
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            _ => None,
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Configuration of one model backend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: TranslationProvider,

    /// Model name, also used as the label on results
    #[serde(default = "String::new")]
    pub model: String,

    /// API key (falls back to the provider's environment variable)
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,

    /// Fixed prior confidence attached to this backend's results.
    /// Defaults by role when omitted from the file.
    pub prior_confidence: f64,
}

impl ProviderConfig {
    /// Provider config with defaults for the given backend
    pub fn new(provider_type: TranslationProvider, prior_confidence: f64) -> Self {
        let (model, endpoint, timeout_secs, rate_limit) = match provider_type {
            TranslationProvider::OpenAI => (
                default_openai_model(),
                default_openai_endpoint(),
                default_timeout_secs(),
                default_openai_rate_limit(),
            ),
            TranslationProvider::Anthropic => (
                default_anthropic_model(),
                default_anthropic_endpoint(),
                default_anthropic_timeout_secs(),
                default_anthropic_rate_limit(),
            ),
            TranslationProvider::Ollama => (
                default_ollama_model(),
                default_ollama_endpoint(),
                default_local_timeout_secs(),
                None,
            ),
            TranslationProvider::LMStudio => (
                default_lmstudio_model(),
                default_lmstudio_endpoint(),
                default_local_timeout_secs(),
                None,
            ),
        };

        Self {
            provider_type,
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs,
            rate_limit,
            prior_confidence,
        }
    }

    /// Configured key, or the provider's environment variable
    pub fn resolved_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }

        self.provider_type
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Model name, falling back to the backend default when blank
    pub fn model_or_default(&self) -> String {
        if !self.model.trim().is_empty() {
            return self.model.clone();
        }
        match self.provider_type {
            TranslationProvider::Ollama => default_ollama_model(),
            TranslationProvider::OpenAI => default_openai_model(),
            TranslationProvider::Anthropic => default_anthropic_model(),
            TranslationProvider::LMStudio => default_lmstudio_model(),
        }
    }

    /// Endpoint, falling back to the backend default when blank
    pub fn endpoint_or_default(&self) -> String {
        if !self.endpoint.trim().is_empty() {
            return self.endpoint.clone();
        }
        match self.provider_type {
            TranslationProvider::Ollama => default_ollama_endpoint(),
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::Anthropic => default_anthropic_endpoint(),
            TranslationProvider::LMStudio => default_lmstudio_endpoint(),
        }
    }

    fn validate(&self, role: &str) -> Result<()> {
        if self.provider_type.requires_api_key() && self.resolved_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for the {} provider ({}); set it in the config or via {}",
                role,
                self.provider_type.display_name(),
                self.provider_type.api_key_env_var().unwrap_or("the environment"),
            ));
        }
        if !(0.0..=1.0).contains(&self.prior_confidence) {
            return Err(anyhow!(
                "prior_confidence for the {} provider must be within [0, 1], got {}",
                role,
                self.prior_confidence
            ));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs for the {} provider must be positive", role));
        }
        Ok(())
    }
}

/// Which backend answers verification requests
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArbiterChoice {
    #[default]
    Primary,
    Secondary,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Provider A, the more trusted backend
    #[serde(default = "default_primary_provider", deserialize_with = "deserialize_primary_provider")]
    pub primary: ProviderConfig,

    /// Provider B
    #[serde(default = "default_secondary_provider", deserialize_with = "deserialize_secondary_provider")]
    pub secondary: ProviderConfig,

    /// Backend used for arbitration in the verified-selection band
    #[serde(default)]
    pub arbiter: ArbiterChoice,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_provider(),
            secondary: default_secondary_provider(),
            arbiter: ArbiterChoice::default(),
            common: TranslationCommonConfig::default(),
        }
    }
}

impl TranslationConfig {
    /// Provider configuration used by the arbiter
    pub fn arbiter_provider(&self) -> &ProviderConfig {
        match self.arbiter {
            ArbiterChoice::Primary => &self.primary,
            ArbiterChoice::Secondary => &self.secondary,
        }
    }
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Temperature parameter for translation requests (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens a translation may produce
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Retry count for transient HTTP failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Segments translated concurrently in grouped mode
    #[serde(default = "default_segment_group_size")]
    pub segment_group_size: usize,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            segment_group_size: default_segment_group_size(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Prior confidence of provider A
pub const PRIMARY_PRIOR_CONFIDENCE: f64 = 0.90;

/// Prior confidence of provider B
pub const SECONDARY_PRIOR_CONFIDENCE: f64 = 0.85;

fn default_primary_provider() -> ProviderConfig {
    ProviderConfig::new(TranslationProvider::OpenAI, PRIMARY_PRIOR_CONFIDENCE)
}

fn default_secondary_provider() -> ProviderConfig {
    ProviderConfig::new(TranslationProvider::Anthropic, SECONDARY_PRIOR_CONFIDENCE)
}

/// Deserialize a provider block, filling a missing prior with the role's default
fn provider_with_prior<'de, D>(deserializer: D, prior: f64) -> std::result::Result<ProviderConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let mut value = serde_json::Value::deserialize(deserializer)?;
    if let Some(fields) = value.as_object_mut() {
        fields
            .entry("prior_confidence")
            .or_insert_with(|| serde_json::Value::from(prior));
    }
    serde_json::from_value(value).map_err(serde::de::Error::custom)
}

fn deserialize_primary_provider<'de, D>(deserializer: D) -> std::result::Result<ProviderConfig, D::Error>
where
    D: Deserializer<'de>,
{
    provider_with_prior(deserializer, PRIMARY_PRIOR_CONFIDENCE)
}

fn deserialize_secondary_provider<'de, D>(deserializer: D) -> std::result::Result<ProviderConfig, D::Error>
where
    D: Deserializer<'de>,
{
    provider_with_prior(deserializer, SECONDARY_PRIOR_CONFIDENCE)
}

fn default_target_language() -> String {
    "es".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

fn default_local_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_segment_group_size() -> usize {
    5
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_lmstudio_endpoint() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-latest".to_string()
}

fn default_lmstudio_model() -> String {
    "local-model".to_string()
}

fn default_openai_rate_limit() -> Option<u32> {
    Some(60)
}

fn default_anthropic_rate_limit() -> Option<u32> {
    // Anthropic's standard limit is 50 requests per minute
    Some(45)
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::resolve_language(&self.target_language)?;

        self.translation.primary.validate("primary")?;
        self.translation.secondary.validate("secondary")?;

        if self.translation.common.segment_group_size == 0 {
            return Err(anyhow!("segment_group_size must be at least 1"));
        }

        self.merge.validate()?;
        self.qa.validate()?;

        Ok(())
    }

    /// Load the configuration file, writing a default one if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            merge: MergePolicy::default(),
            qa: QaThresholds::default(),
            log_level: LogLevel::default(),
        }
    }
}
