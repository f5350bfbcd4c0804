//! Keyword relevance scoring.

use crate::mark::{MARK_START, SEARCH_MARK_LEFT, mark_text, sentinels_to_mark};
use crate::text::escape_html;

/// Jaro-Winkler boost threshold used for search scores.
const BOOST_THRESHOLD: f64 = 0.7;

/// Jaro-Winkler prefix length used for search scores.
const PREFIX_SIZE: usize = 4;

/// Jaro-Winkler prefix scaling factor.
const PREFIX_SCALE: f64 = 0.1;

/// Jaro similarity of two strings, in `[0, 1]`.
pub fn jaro(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return if a.is_empty() && b.is_empty() { 1.0 } else { 0.0 };
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }
    if matches == 0 {
        return 0.0;
    }

    let a_seq = a.iter().zip(&a_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let b_seq = b.iter().zip(&b_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let half_transpositions = a_seq.zip(b_seq).filter(|(x, y)| x != y).count();

    let m = matches as f64;
    let t = (half_transpositions / 2) as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler similarity.
///
/// The common-prefix bonus applies only when the Jaro score exceeds `boost_threshold`, and
/// counts at most `prefix_size` leading characters.
pub fn jaro_winkler(a: &str, b: &str, boost_threshold: f64, prefix_size: usize) -> f64 {
    let j = jaro(a, b);
    if j <= boost_threshold {
        return j;
    }
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(prefix_size)
        .take_while(|(x, y)| x == y)
        .count();
    j + PREFIX_SCALE * prefix as f64 * (1.0 - j)
}

/// Marks `keyword` in `text` and scores the match.
///
/// With an empty keyword, backend sentinels are converted to `<mark>` tags (or the text is
/// only escaped) and the score is zero. Otherwise the score adds 1 for a match at position
/// 0, 1 per mark, and the Jaro-Winkler similarity of text and keyword, then is negated so
/// stronger matches sort first.
pub fn mark_search(
    text: &str,
    keyword: &str,
    before_len: usize,
    case_sensitive: bool,
) -> (String, f64) {
    if keyword.is_empty() {
        if text.contains(SEARCH_MARK_LEFT) {
            return (sentinels_to_mark(text), 0.0);
        }
        return (escape_html(text), 0.0);
    }

    let (pos, marked) = mark_text(text, keyword, before_len, case_sensitive);
    let mut score = 0.0;
    if let Some(pos) = pos {
        if pos == 0 {
            score += 1.0;
        }
        score += marked.matches(MARK_START).count() as f64;
        score += jaro_winkler(text, keyword, BOOST_THRESHOLD, PREFIX_SIZE);
    }
    (marked, -score)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Asserts two floats are within 1e-4.
    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn test_jaro_known_values() {
        approx(jaro("MARTHA", "MARHTA"), 0.9444);
        approx(jaro("DIXON", "DICKSONX"), 0.7667);
        approx(jaro("abc", "abc"), 1.0);
        approx(jaro("abc", "xyz"), 0.0);
        approx(jaro("", ""), 1.0);
        approx(jaro("a", ""), 0.0);
    }

    #[test]
    fn test_jaro_winkler_known_values() {
        approx(jaro_winkler("MARTHA", "MARHTA", 0.7, 4), 0.9611);
        approx(jaro_winkler("DIXON", "DICKSONX", 0.7, 4), 0.8133);
    }

    #[test]
    fn test_jaro_winkler_below_threshold_is_plain_jaro() {
        let plain = jaro("abcd", "wxya");
        assert_eq!(jaro_winkler("abcd", "wxya", 0.7, 4), plain);
    }

    #[test]
    fn test_mark_search_scores_prefix_match_higher() {
        let (marked, at_start) = mark_search("abc note", "abc", 36, false);
        assert_eq!(marked, "<mark>abc</mark> note");
        let (_, later) = mark_search("note abc", "abc", 36, false);
        assert!(at_start < later);
        assert!(at_start < -2.0);
    }

    #[test]
    fn test_mark_search_no_match_scores_zero() {
        let (marked, score) = mark_search("nothing here", "zzz", 36, false);
        assert_eq!(marked, "nothing here");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_mark_search_empty_keyword_converts_sentinels() {
        let (marked, score) = mark_search("My __@mark__ABC__mark@__ Note", "", 36, false);
        assert_eq!(marked, "My <mark>ABC</mark> Note");
        assert_eq!(score, 0.0);

        let (plain, _) = mark_search("a < b", "", 36, false);
        assert_eq!(plain, "a &lt; b");
    }
}
