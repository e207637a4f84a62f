/*!
 * Batch translation scenarios over mock providers
 */

use govdub::errors::{ProviderError, TranslationError};
use govdub::providers::mock::MockProvider;
use govdub::translation::{MergeStrategy, TranslationContext, TranslationSegment};

use crate::common::{self, MODEL_A, MODEL_B};

#[tokio::test]
async fn test_translateBatch_withAgreeingProviders_shouldBeHighAgreement() {
    let a = MockProvider::replying("Hola, ciudadanos.");
    let b = MockProvider::replying("Hola, ciudadanos.");
    let arbiter = MockProvider::replying("B");
    let orchestrator = common::mock_orchestrator(&a, &b, &arbiter);
    let segments = vec![TranslationSegment::new(1, "Hello, citizens.", 0.0, 2.0)];

    let result = orchestrator.translate_batch(&segments, "es", None).await.unwrap();

    assert_eq!(result.target_language, "es");
    assert_eq!(result.segments.len(), 1);
    let merged = &result.segments[0];
    assert_eq!(merged.segment_id, 1);
    assert_eq!(merged.agreement_score, 1.0);
    assert_eq!(merged.merge_strategy, MergeStrategy::HighAgreement);
    assert_eq!(merged.confidence, 0.95);
    assert_eq!(merged.primary_model, MODEL_A);
    assert_eq!(merged.text, "Hola, ciudadanos.");
    assert_eq!(merged.provider_results.a.confidence, 0.90);
    assert_eq!(merged.provider_results.b.confidence, 0.85);
    assert_eq!(result.overall_confidence, 0.95);
    assert_eq!(arbiter.request_count(), 0);
}

#[tokio::test]
async fn test_translateBatch_withUnrelatedCandidates_shouldFlagAndKeepA() {
    let a = MockProvider::replying("We will invest fifty million dollars.");
    let b = MockProvider::replying("Completely unrelated sentence about weather.");
    let arbiter = MockProvider::replying("B");
    let orchestrator = common::mock_orchestrator(&a, &b, &arbiter);
    let segments = vec![TranslationSegment::new(1, "We will invest fifty million dollars.", 0.0, 3.0)];

    let result = orchestrator.translate_batch(&segments, "es", None).await.unwrap();

    let merged = &result.segments[0];
    assert!(merged.agreement_score <= 0.70);
    assert_eq!(merged.merge_strategy, MergeStrategy::LowAgreementFlagged);
    assert_eq!(merged.confidence, 0.70);
    assert_eq!(merged.text, "We will invest fifty million dollars.");
    assert_eq!(merged.primary_model, MODEL_A);
    assert_eq!(arbiter.request_count(), 0);
}

#[tokio::test]
async fn test_translateBatch_withProviderBFailingOnSegmentTwo_shouldAbortWholeBatch() {
    common::init_logging();
    let a = MockProvider::working();
    // Second request fails, which is segment 2 in a sequential batch
    let b = MockProvider::intermittent(2);
    let orchestrator = common::mock_orchestrator(&a, &b, &MockProvider::replying("A"));

    let result = orchestrator
        .translate_batch(&common::sample_segments(), "es", None)
        .await;

    match result {
        Err(TranslationError::ProviderCallFailure {
            segment_id,
            provider,
            source,
        }) => {
            assert_eq!(segment_id, 2);
            assert_eq!(provider, MODEL_B);
            assert!(matches!(source, ProviderError::ApiError { status_code: 503, .. }));
        }
        other => panic!("expected ProviderCallFailure, got {:?}", other),
    }
    // Segment 3 was never sent
    assert_eq!(b.request_count(), 2);
    assert_eq!(a.request_count(), 2);
}

#[tokio::test]
async fn test_translateBatch_shouldPreserveInputOrder() {
    let orchestrator = common::mock_orchestrator(
        &common::echoing_provider("A: "),
        &common::echoing_provider("A: "),
        &MockProvider::replying("A"),
    );
    let segments = vec![
        TranslationSegment::new(9, "Ninth", 0.0, 1.0),
        TranslationSegment::new(2, "Second", 1.0, 2.0),
        TranslationSegment::new(5, "Fifth", 2.0, 3.0),
        TranslationSegment::new(1, "First", 3.0, 4.0),
    ];

    let sequential = orchestrator.translate_batch(&segments, "pl", None).await.unwrap();
    let grouped = orchestrator
        .clone()
        .with_group_size(3)
        .translate_batch_grouped(&segments, "pl", None, |_, _| {})
        .await
        .unwrap();

    for result in [sequential, grouped] {
        let ids: Vec<u32> = result.segments.iter().map(|s| s.segment_id).collect();
        assert_eq!(ids, vec![9, 2, 5, 1]);
        assert_eq!(result.segments[3].text, "A: First");
    }
}

#[tokio::test]
async fn test_translateBatch_shouldShareOneSystemPromptAcrossProviders() {
    let a = MockProvider::working();
    let b = MockProvider::working();
    let orchestrator = common::mock_orchestrator(&a, &b, &MockProvider::replying("A"));
    let context = TranslationContext::default()
        .with_speaker("Commissioner Okafor")
        .with_description("Heat advisory");

    orchestrator
        .translate_batch(&common::sample_segments(), "ar", Some(&context))
        .await
        .unwrap();

    let prompts: Vec<String> = a
        .requests()
        .into_iter()
        .chain(b.requests())
        .map(|r| r.system.unwrap_or_default())
        .collect();
    assert_eq!(prompts.len(), 6);
    assert!(prompts.iter().all(|p| p == &prompts[0]));
    assert!(prompts[0].contains("Commissioner Okafor"));
    assert!(prompts[0].contains("Heat advisory"));
    assert!(prompts[0].contains("into Arabic"));
}

#[tokio::test]
async fn test_translateBatch_inVerifiedBand_shouldConsultArbiter() {
    let a = MockProvider::replying("uno dos tres cuatro cinco seis siete ocho nueve");
    let b = MockProvider::replying("uno dos tres cuatro cinco seis siete ocho diez");
    let arbiter = MockProvider::replying("B");
    let orchestrator = common::mock_orchestrator(&a, &b, &arbiter);

    let result = orchestrator
        .translate_batch(&common::sample_segments(), "es", None)
        .await
        .unwrap();

    assert_eq!(arbiter.request_count(), 3);
    assert!(result.segments.iter().all(|s| s.merge_strategy == MergeStrategy::VerifiedSelection));
    assert!(result.segments.iter().all(|s| s.primary_model == MODEL_B && s.confidence == 0.85));
    assert!((result.overall_confidence - 0.85).abs() < 1e-9);
    assert_eq!(result.usage.arbiter_calls, 3);
    assert_eq!(result.usage.provider_calls, 6);
}

#[tokio::test]
async fn test_translateBatch_withBrokenArbiter_shouldStillSucceed() {
    let a = MockProvider::replying("uno dos tres cuatro cinco seis siete ocho nueve");
    let b = MockProvider::replying("uno dos tres cuatro cinco seis siete ocho diez");
    let orchestrator = common::mock_orchestrator(&a, &b, &MockProvider::failing());

    let result = orchestrator
        .translate_batch(&common::sample_segments(), "es", None)
        .await
        .unwrap();

    assert!(result.segments.iter().all(|s| s.arbiter_fallback && s.confidence == 0.75));
    assert!(result.segments.iter().all(|s| s.primary_model == MODEL_A));
}

#[tokio::test]
async fn test_translateBatch_withEmptyReply_shouldReportEmptyResponse() {
    let orchestrator =
        common::mock_orchestrator(&MockProvider::empty(), &MockProvider::working(), &MockProvider::replying("A"));

    let err = orchestrator
        .translate_batch(&common::sample_segments(), "es", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TranslationError::ProviderCallFailure {
            segment_id: 1,
            source: ProviderError::EmptyResponse,
            ..
        }
    ));
}

#[tokio::test]
async fn test_translateBatchGrouped_withFailure_shouldReturnNoResult() {
    let orchestrator = common::mock_orchestrator(
        &MockProvider::working(),
        &MockProvider::intermittent(2),
        &MockProvider::replying("A"),
    )
    .with_group_size(3);

    let err = orchestrator
        .translate_batch_grouped(&common::sample_segments(), "es", None, |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::ProviderCallFailure { provider, .. } if provider == MODEL_B));
}

#[tokio::test]
async fn test_translateBatch_shouldAggregateUsage() {
    let orchestrator = common::mock_orchestrator(
        &MockProvider::replying("Hola"),
        &MockProvider::replying("Hola"),
        &MockProvider::replying("A"),
    );

    let result = orchestrator
        .translate_batch(&common::sample_segments(), "es", None)
        .await
        .unwrap();

    assert_eq!(result.usage.provider_calls, 6);
    assert_eq!(result.usage.arbiter_calls, 0);
    assert!(result.usage.prompt_tokens > 0);
    assert_eq!(
        result.usage.total_tokens(),
        result.usage.prompt_tokens + result.usage.completion_tokens
    );
}

#[test]
fn test_translateBatch_withNoSegments_shouldReturnZeroConfidence() {
    let a = MockProvider::working();
    let orchestrator = common::mock_orchestrator(&a, &MockProvider::working(), &MockProvider::replying("A"));

    let result = tokio_test::block_on(orchestrator.translate_batch(&[], "ko", None)).unwrap();

    assert!(result.segments.is_empty());
    assert_eq!(result.overall_confidence, 0.0);
    assert_eq!(result.usage.provider_calls, 0);
    assert_eq!(a.request_count(), 0);
}

#[tokio::test]
async fn test_translateBatch_shouldCallBothProvidersConcurrently() {
    let a = MockProvider::slow(300);
    let b = MockProvider::slow(300);
    let arbiter = MockProvider::replying("A");
    let orchestrator = common::mock_orchestrator(&a, &b, &arbiter);
    let segments = vec![TranslationSegment::new(1, "Hello, citizens.", 0.0, 2.0)];

    let started = std::time::Instant::now();
    let result = orchestrator.translate_batch(&segments, "es", None).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.segments.len(), 1);
    assert_eq!(a.request_count(), 1);
    assert_eq!(b.request_count(), 1);
    // Sequential calls would take at least 600ms
    assert!(elapsed.as_millis() < 550, "segment took {:?}", elapsed);
}
