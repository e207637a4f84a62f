/*!
 * Property tests for agreement scoring
 */

use govdub::translation::similarity::jaccard_similarity;

const SAMPLES: [&str; 8] = [
    "",
    " ",
    "Hola, ciudadanos.",
    "hola, CIUDADANOS.",
    "We will invest fifty million dollars.",
    "Completely unrelated sentence about weather.",
    "Les demandes ouvrent le premier mars.",
    "Les inscriptions ouvrent le 1er mars.",
];

#[test]
fn test_similarity_shouldBeSymmetric() {
    for a in SAMPLES {
        for b in SAMPLES {
            assert_eq!(jaccard_similarity(a, b), jaccard_similarity(b, a), "{:?} vs {:?}", a, b);
        }
    }
}

#[test]
fn test_similarity_shouldStayWithinBounds() {
    for a in SAMPLES {
        for b in SAMPLES {
            let score = jaccard_similarity(a, b);
            assert!((0.0..=1.0).contains(&score), "{:?} vs {:?} gave {}", a, b, score);
        }
    }
}

#[test]
fn test_similarity_withItself_shouldBeOne() {
    for text in SAMPLES.iter().filter(|t| !t.is_empty()) {
        assert_eq!(jaccard_similarity(text, text), 1.0, "{:?}", text);
    }
}

#[test]
fn test_similarity_shouldIgnoreCase() {
    assert_eq!(jaccard_similarity(SAMPLES[2], SAMPLES[3]), 1.0);
}

#[test]
fn test_similarity_withUnrelatedSentences_shouldBeLow() {
    assert!(jaccard_similarity(SAMPLES[4], SAMPLES[5]) <= 0.70);
}

#[test]
fn test_similarity_withParaphrase_shouldOnlyCountSharedTokens() {
    // {les, ouvrent, le, mars.} shared out of 8 distinct tokens
    assert_eq!(jaccard_similarity(SAMPLES[6], SAMPLES[7]), 0.5);
}
