/*!
 * Tests for regime selection and the merge resolver
 */

use std::sync::Arc;

use govdub::language_utils::resolve_language;
use govdub::providers::mock::MockProvider;
use govdub::translation::{
    MergePolicy, MergeResolver, MergeStrategy, ProviderTranslationResult, TranslationMetadata, TranslationSegment,
    VerificationArbiter,
};

fn candidate(text: &str, model: &str) -> ProviderTranslationResult {
    ProviderTranslationResult {
        translated_text: text.to_string(),
        confidence: 0.9,
        model: model.to_string(),
        metadata: TranslationMetadata {
            word_count: text.split_whitespace().count(),
            estimated_duration_seconds: 1.0,
            pacing_ratio: 0.5,
            prompt_tokens: Some(10),
            completion_tokens: Some(5),
            latency_ms: 1,
        },
    }
}

fn segment() -> TranslationSegment {
    TranslationSegment::new(1, "Applications open on March first.", 0.0, 2.0)
}

#[test]
fn test_strategyFor_shouldCoverEveryScoreExactlyOnce() {
    let policy = MergePolicy::default();
    for step in 0..=1000 {
        let score = step as f64 / 1000.0;
        let strategy = policy.strategy_for(score);
        let expected = if score >= 0.90 {
            MergeStrategy::HighAgreement
        } else if score > 0.70 {
            MergeStrategy::VerifiedSelection
        } else {
            MergeStrategy::LowAgreementFlagged
        };
        assert_eq!(strategy, expected, "score {}", score);
    }
}

#[test]
fn test_strategyFor_atExactBoundaries_shouldUseInclusiveLowerRule() {
    let policy = MergePolicy::default();
    assert_eq!(policy.strategy_for(0.90), MergeStrategy::HighAgreement);
    assert_eq!(policy.strategy_for(0.70), MergeStrategy::LowAgreementFlagged);
}

#[tokio::test]
async fn test_merge_withDifferentHighScores_shouldReportSameConfidence() {
    let resolver = MergeResolver::new(VerificationArbiter::new(Arc::new(MockProvider::replying("A"))));
    let spanish = resolve_language("es").unwrap();

    // score 1.0
    let identical = resolver
        .merge(&segment(), candidate("a b c d e f g h i j", "x"), candidate("a b c d e f g h i j", "y"), spanish)
        .await;
    // score 10/11
    let near = resolver
        .merge(&segment(), candidate("a b c d e f g h i j", "x"), candidate("a b c d e f g h i j k", "y"), spanish)
        .await;

    assert_eq!(identical.merge_strategy, MergeStrategy::HighAgreement);
    assert_eq!(near.merge_strategy, MergeStrategy::HighAgreement);
    assert!(identical.agreement_score > near.agreement_score);
    assert_eq!(identical.confidence, near.confidence);
    assert_eq!(near.confidence, 0.95);
}

#[tokio::test]
async fn test_merge_withArbiterReplyOutsideAB_shouldReturnAAtFallbackConfidence() {
    let spanish = resolve_language("es").unwrap();
    for reply in ["C", "", "The answer is B", "A and B"] {
        let resolver = MergeResolver::new(VerificationArbiter::new(Arc::new(MockProvider::replying(reply))));
        let merged = resolver
            .merge(
                &segment(),
                candidate("uno dos tres cuatro cinco seis siete ocho nueve", "model-a"),
                candidate("uno dos tres cuatro cinco seis siete ocho diez", "model-b"),
                spanish,
            )
            .await;

        assert_eq!(merged.text, "uno dos tres cuatro cinco seis siete ocho nueve", "reply {:?}", reply);
        assert_eq!(merged.confidence, 0.75);
        assert_eq!(merged.primary_model, "model-a");
        assert!(merged.arbiter_fallback);
    }
}

#[tokio::test]
async fn test_merge_withCustomPolicy_shouldUseConfiguredThresholds() {
    let policy = MergePolicy {
        high_agreement_threshold: 0.5,
        low_agreement_threshold: 0.2,
        ..MergePolicy::default()
    };
    let resolver = MergeResolver::with_policy(VerificationArbiter::new(Arc::new(MockProvider::replying("A"))), policy);
    let spanish = resolve_language("es").unwrap();

    let merged = resolver
        .merge(&segment(), candidate("a b c", "x"), candidate("b c d", "y"), spanish)
        .await;

    assert_eq!(merged.agreement_score, 0.5);
    assert_eq!(merged.merge_strategy, MergeStrategy::HighAgreement);
}
