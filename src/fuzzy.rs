//! Subsequence fuzzy matching with a quality score.
//!
//! Single greedy pass over the candidate: every pattern character must
//! appear in order, bonuses reward tight and well-placed matches, penalties
//! accumulate for skipped letters (which also favors shorter candidates).

const ADJACENCY_BONUS: i32 = 5;
const SEPARATOR_BONUS: i32 = 10;
const CAMEL_BONUS: i32 = 10;
const LEADING_LETTER_PENALTY: i32 = -3;
const MAX_LEADING_LETTER_PENALTY: i32 = -9;
const UNMATCHED_LETTER_PENALTY: i32 = -1;

/// Case-insensitive subsequence match of `pattern` against `candidate`.
/// Returns the score on a match, `None` otherwise. The empty pattern
/// matches everything with score 0, which is what "list all" paths rely on.
pub fn fuzzy_match(pattern: &str, candidate: &str) -> Option<i32> {
    if pattern.is_empty() {
        return Some(0);
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let mut pattern_idx = 0;

    let mut score = 0;
    let mut prev_matched = false;
    let mut prev_lower = false;
    // Start of the candidate counts as a separator boundary.
    let mut prev_separator = true;

    // When several candidate letters could satisfy the current pattern
    // letter, keep the highest-scoring one seen so far and commit it once
    // the match advances.
    let mut best_letter: Option<char> = None;
    let mut best_letter_score = 0;

    for (idx, ch) in candidate.chars().enumerate() {
        let pattern_letter = pattern.get(pattern_idx).copied();
        let next_match = pattern_letter.is_some_and(|p| chars_eq(p, ch));
        let rematch = best_letter.is_some_and(|b| chars_eq(b, ch));

        let advanced = next_match && best_letter.is_some();
        let pattern_repeat = match (best_letter, pattern_letter) {
            (Some(best), Some(p)) => chars_eq(best, p),
            _ => false,
        };
        if advanced || pattern_repeat {
            score += best_letter_score;
            best_letter = None;
            best_letter_score = 0;
        }

        if next_match || rematch {
            let mut new_score = 0;

            // Letters skipped before the very first match cost up to
            // MAX_LEADING_LETTER_PENALTY in total.
            if pattern_idx == 0 {
                score += (LEADING_LETTER_PENALTY * idx as i32).max(MAX_LEADING_LETTER_PENALTY);
            }

            if prev_matched {
                new_score += ADJACENCY_BONUS;
            }
            if prev_separator {
                new_score += SEPARATOR_BONUS;
            }
            if prev_lower && ch.is_uppercase() {
                new_score += CAMEL_BONUS;
            }

            if next_match {
                pattern_idx += 1;
            }

            if new_score >= best_letter_score {
                if best_letter.is_some() {
                    score += UNMATCHED_LETTER_PENALTY;
                }
                best_letter = Some(ch);
                best_letter_score = new_score;
            }

            prev_matched = true;
        } else {
            score += UNMATCHED_LETTER_PENALTY;
            prev_matched = false;
        }

        prev_lower = ch.is_lowercase();
        prev_separator = ch == '_' || ch == ' ';
    }

    score += best_letter_score;

    if pattern_idx < pattern.len() {
        return None;
    }
    Some(score)
}

fn chars_eq(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
