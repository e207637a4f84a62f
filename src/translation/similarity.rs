/*!
 * Agreement scoring between two candidate translations.
 *
 * Token-set Jaccard overlap: language-agnostic and cheap, but blind to word
 * order and morphology. The merge thresholds are tuned against exactly this
 * metric, so it is only used to pick a disagreement-handling regime.
 */

use std::collections::HashSet;

fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|token| token.to_lowercase()).collect()
}

/// Jaccard similarity of the lower-cased whitespace token sets, in [0, 1].
///
/// When neither text has a token the score is 1.0 for identical texts and
/// 0.0 otherwise.
pub fn jaccard_similarity(text_a: &str, text_b: &str) -> f64 {
    let tokens_a = token_set(text_a);
    let tokens_b = token_set(text_b);

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return if text_a == text_b { 1.0 } else { 0.0 };
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    intersection as f64 / union as f64
}
