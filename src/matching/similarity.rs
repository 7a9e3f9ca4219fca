//! Name similarity.
//!
//! Scores are a length-padded Hamming similarity: characters are compared
//! position by position over the shorter string and every extra character of
//! the longer one counts as a mismatch.

use crate::model::MatchResult;

/// Similarity of two strings in `[0, 1]`. Symmetric and case-sensitive.
pub fn similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let max_len = len_a.max(len_b);
    if max_len == 0 {
        return 1.0;
    }

    let common = len_a.min(len_b);
    let prefix_a: String = a.chars().take(common).collect();
    let prefix_b: String = b.chars().take(common).collect();
    // Equal char counts by construction, so hamming cannot fail
    let mismatches = strsim::hamming(&prefix_a, &prefix_b).unwrap_or(common);
    let distance = mismatches + (max_len - common);

    1.0 - distance as f64 / max_len as f64
}

/// Normalized form of a name used for scoring: trimmed, lower-case, with a
/// single trailing plural `s` removed from longer words.
pub fn comparison_key(name: &str) -> String {
    let key = name.trim().to_lowercase();
    if key.chars().count() > 3 && key.ends_with('s') && !key.ends_with("ss") {
        key[..key.len() - 1].to_string()
    } else {
        key
    }
}

/// Similarity of the comparison keys of two names
pub fn name_similarity(a: &str, b: &str) -> f64 {
    similarity(&comparison_key(a), &comparison_key(b))
}

/// Pick the candidate whose name is most similar to `query`.
///
/// Candidates are visited in the given order; a later candidate only wins with
/// a strictly higher score, so ties go to the first one. A candidate whose key
/// equals the query's key is returned immediately. Returns `None` when no
/// candidate reaches `threshold` or the best score is 0.
pub fn best_match<'a, T>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a T>,
    name_of: impl Fn(&T) -> &str,
    threshold: f64,
) -> Option<MatchResult<&'a T>>
where
    T: 'a,
{
    let query_key = comparison_key(query);
    let mut best: Option<MatchResult<&'a T>> = None;

    for candidate in candidates {
        let candidate_key = comparison_key(name_of(candidate));
        if candidate_key == query_key {
            return Some(MatchResult::matched(candidate, 1.0));
        }

        let score = similarity(&query_key, &candidate_key);
        let best_score = best.as_ref().map_or(0.0, |m| m.score);
        if score >= threshold && score > best_score {
            best = Some(MatchResult::matched(candidate, score));
        }
    }

    best
}
