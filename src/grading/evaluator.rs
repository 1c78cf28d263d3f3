use std::collections::HashSet;

/// Awarded when the normalized submission equals the normalized answer key.
pub const FULL_MARKS: f64 = 100.0;
/// Awarded for every other submission, including empty ones.
pub const PARTIAL_MARKS: f64 = 50.0;

/// Trims, collapses whitespace runs to a single space and lowercases.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn word_set(normalized: &str) -> HashSet<&str> {
    normalized.split(' ').filter(|w| !w.is_empty()).collect()
}

/// Grades `submission` against `answer_key`.
///
/// Both texts are normalized and split into word sets. A submission whose
/// words cover the key's words scores full marks only when the normalized
/// texts are identical; anything else scores partial marks. This is a coarse
/// text heuristic, not a check that the query is correct.
#[must_use]
pub fn evaluate(answer_key: &str, submission: &str) -> f64 {
    let expected = normalize(answer_key);
    let submitted = normalize(submission);

    let expected_words = word_set(&expected);
    let submitted_words = word_set(&submitted);

    if submitted_words.is_superset(&expected_words) {
        if submitted == expected {
            FULL_MARKS
        } else {
            PARTIAL_MARKS
        }
    } else {
        PARTIAL_MARKS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_and_case() {
        assert_eq!(
            normalize("  SELECT *\n\tFROM   Employees  "),
            "select * from employees"
        );
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_identical_key_scores_full_marks() {
        let key = "SELECT first_name FROM employees WHERE salary > 1000";
        assert_eq!(evaluate(key, key), FULL_MARKS);
    }

    #[test]
    fn test_formatting_differences_still_score_full_marks() {
        assert_eq!(
            evaluate("select * from t", "  SELECT *\n   FROM T "),
            FULL_MARKS
        );
    }

    #[test]
    fn test_superset_with_extra_words_scores_partial() {
        assert_eq!(
            evaluate("select * from t", "select * from t extra"),
            PARTIAL_MARKS
        );
    }

    #[test]
    fn test_trailing_punctuation_is_a_different_word() {
        assert_eq!(evaluate("select * from t", "select * from t;"), PARTIAL_MARKS);
    }

    #[test]
    fn test_missing_word_scores_partial() {
        assert_eq!(
            evaluate("select id from t", "select name from t"),
            PARTIAL_MARKS
        );
    }

    #[test]
    fn test_empty_submission_scores_partial() {
        assert_eq!(evaluate("a b", ""), PARTIAL_MARKS);
        assert_eq!(evaluate("a b", "   \n"), PARTIAL_MARKS);
    }

    #[test]
    fn test_reordered_words_score_partial() {
        assert_eq!(evaluate("select a, b from t", "select b, a from t"), PARTIAL_MARKS);
    }

    #[test]
    fn test_duplicate_words_collapse_in_the_set() {
        // Same word set, different text: covered but not equal.
        assert_eq!(evaluate("a b", "a b b"), PARTIAL_MARKS);
    }
}
