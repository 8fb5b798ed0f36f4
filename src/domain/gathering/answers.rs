//! Short-form answer matching and gender normalization.
//!
//! Common one-word replies are resolved here without a model call, which
//! saves a round-trip and keeps easy cases deterministic.

/// Words that identify the answering party as female.
const FEMALE_WORDS: &[&str] = &["wife", "woman", "female", "girl", "she", "her"];

/// Words that identify the answering party as male.
const MALE_WORDS: &[&str] = &["husband", "man", "male", "boy", "he", "him"];

/// Affirmative short-form replies.
const YES_WORDS: &[&str] = &["yes", "yeah", "yep", "correct", "right"];

/// Negative short-form replies.
const NO_WORDS: &[&str] = &["no", "nope", "never"];

/// Returns true if a fact key asks about the subject's gender.
pub fn is_gender_key(key: &str) -> bool {
    key.contains("gender")
}

/// Normalizes a free-text gender answer to `female`/`male`.
///
/// Matching is on word boundaries so that, say, "mother" does not match
/// "her". When no gender word is present the answer passes through
/// unchanged.
pub fn normalize_gender(answer: &str) -> String {
    for word in words_of(answer) {
        if FEMALE_WORDS.contains(&word.as_str()) {
            return "female".to_string();
        }
        if MALE_WORDS.contains(&word.as_str()) {
            return "male".to_string();
        }
    }
    answer.to_string()
}

/// Attempts to resolve a reply without invoking the model.
///
/// Returns `Some(value)` for yes/no answers and for gender answers to
/// gender-targeted questions; `None` means the model path is needed.
pub fn match_short_form(target_key: &str, answer: &str) -> Option<String> {
    let trimmed = answer.trim();
    let words = words_of(trimmed);

    if is_gender_key(target_key) {
        let normalized = normalize_gender(trimmed);
        if normalized != trimmed {
            return Some(normalized);
        }
    }

    // Only treat very short replies as bare yes/no; a sentence that happens
    // to start with "yes" usually carries more detail worth extracting.
    if words.len() <= 2 {
        if let Some(first) = words.first() {
            if YES_WORDS.contains(&first.as_str()) {
                return Some("yes".to_string());
            }
            if NO_WORDS.contains(&first.as_str()) {
                return Some("no".to_string());
            }
        }
    }

    None
}

fn words_of(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod gender {
        use super::*;

        #[test]
        fn wife_normalizes_to_female() {
            assert_eq!(normalize_gender("I am the wife"), "female");
        }

        #[test]
        fn he_normalizes_to_male() {
            assert_eq!(normalize_gender("he hit me"), "male");
        }

        #[test]
        fn unknown_passes_through_unchanged() {
            assert_eq!(normalize_gender("not sure"), "not sure");
        }

        #[test]
        fn punctuation_does_not_block_matching() {
            assert_eq!(normalize_gender("Wife."), "female");
        }

        #[test]
        fn word_boundaries_are_respected() {
            // "mother" contains "her" but is not a gender word.
            assert_eq!(normalize_gender("his mother"), "his mother");
        }

        #[test]
        fn every_vocabulary_word_normalizes() {
            for w in FEMALE_WORDS {
                assert_eq!(normalize_gender(w), "female");
            }
            for w in MALE_WORDS {
                assert_eq!(normalize_gender(w), "male");
            }
        }
    }

    mod short_form {
        use super::*;

        #[test]
        fn gender_key_with_gender_answer_resolves() {
            assert_eq!(
                match_short_form("user_gender", "I am the wife"),
                Some("female".to_string())
            );
        }

        #[test]
        fn gender_key_with_vague_answer_defers_to_model() {
            assert_eq!(match_short_form("user_gender", "prefer not to say"), None);
        }

        #[test]
        fn bare_yes_resolves() {
            assert_eq!(
                match_short_form("previous_complaints", "Yes"),
                Some("yes".to_string())
            );
        }

        #[test]
        fn bare_no_resolves() {
            assert_eq!(
                match_short_form("previous_complaints", "nope"),
                Some("no".to_string())
            );
        }

        #[test]
        fn yes_with_detail_defers_to_model() {
            assert_eq!(
                match_short_form("previous_complaints", "yes, I filed one last year"),
                None
            );
        }

        #[test]
        fn free_text_defers_to_model() {
            assert_eq!(match_short_form("marriage_date", "we married in 2015"), None);
        }
    }

    mod gender_key {
        use super::*;

        #[test]
        fn detects_gender_keys() {
            assert!(is_gender_key("user_gender"));
            assert!(is_gender_key("victim_gender"));
            assert!(!is_gender_key("marriage_date"));
        }
    }

    proptest! {
        #[test]
        fn normalize_gender_is_total_and_closed(answer in ".{0,200}") {
            let out = normalize_gender(&answer);
            prop_assert!(out == "female" || out == "male" || out == answer);
        }
    }
}
