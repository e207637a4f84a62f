/*!
 * Tests for error types and their messages
 */

use std::error::Error;

use govdub::errors::{AppError, ArbitrationError, ProviderError, TranslationError};

#[test]
fn test_providerCallFailure_shouldNameSegmentProviderAndCause() {
    let error = TranslationError::ProviderCallFailure {
        segment_id: 2,
        provider: "claude-3-5-sonnet-latest".to_string(),
        source: ProviderError::Timeout { millis: 60_000 },
    };

    let message = error.to_string();
    assert!(message.contains("segment 2"));
    assert!(message.contains("claude-3-5-sonnet-latest"));
    assert!(message.contains("60000ms"));
    assert_eq!(error.segment_id(), Some(2));
    assert!(error.source().is_some());
}

#[test]
fn test_invalidInput_shouldCarryNoSegmentId() {
    assert_eq!(TranslationError::InvalidInput("bad".into()).segment_id(), None);
}

#[test]
fn test_arbitrationError_shouldWrapProviderErrors() {
    let error: ArbitrationError = ProviderError::EmptyResponse.into();
    assert!(matches!(error, ArbitrationError::Provider(ProviderError::EmptyResponse)));
    assert!(ArbitrationError::Unparseable("C".into()).to_string().contains("\"C\""));
}

#[test]
fn test_appError_shouldConvertFromLibraryErrors() {
    let from_translation: AppError = TranslationError::InvalidInput("segment 1 has no text".into()).into();
    assert!(matches!(from_translation, AppError::Translation(_)));

    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "segments.json").into();
    assert!(matches!(from_io, AppError::File(_)));

    let from_anyhow: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(from_anyhow, AppError::Unknown(_)));
}
