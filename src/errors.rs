/*!
 * Error types for the govdub translation core.
 *
 * This module contains custom error types for the different layers of the
 * crate, using the thiserror crate for ergonomic error definitions:
 * - `ProviderError`: transport and API failures of a single model call
 * - `TranslationError`: batch-level failures surfaced to the caller
 * - `ArbitrationError`: verification failures, absorbed by the merge resolver
 * - `AppError`: everything the command-line binary can report
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The call did not complete within the configured timeout
    #[error("Request timed out after {millis}ms")]
    Timeout {
        /// Timeout that expired, in milliseconds
        millis: u64,
    },

    /// The model answered with nothing usable
    #[error("Provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether the HTTP clients should retry after this error
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::Timeout { .. } => true,
            Self::ApiError { status_code, .. } => *status_code == 429 || *status_code >= 500,
            _ => false,
        }
    }

    /// Map a non-success HTTP status and body to the matching variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors that abort a translation batch
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Malformed segment or request, rejected before any provider call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Target language outside the supported table
    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),

    /// A translation provider failed for one segment
    #[error("Provider call failed for segment {segment_id} ({provider}): {source}")]
    ProviderCallFailure {
        /// Segment whose translation failed
        segment_id: u32,
        /// Label of the failing provider
        provider: String,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },
}

impl TranslationError {
    /// Segment id attached to the failure, if any
    pub fn segment_id(&self) -> Option<u32> {
        match self {
            Self::ProviderCallFailure { segment_id, .. } => Some(*segment_id),
            _ => None,
        }
    }
}

/// Verification failures. These never leave the merge resolver.
#[derive(Error, Debug)]
pub enum ArbitrationError {
    /// The arbitration call itself failed
    #[error("Arbiter call failed: {0}")]
    Provider(#[from] ProviderError),

    /// The arbiter answered something other than "A" or "B"
    #[error("Unparseable arbiter verdict: {0:?}")]
    Unparseable(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
