//! Deterministic keyword-based query classification.
//!
//! Used whenever the structured analysis call fails (backend error, parse
//! error, malformed output). This path never errors: it always produces a
//! usable [`IntentAnalysis`] from the query text alone.

use std::collections::BTreeMap;

use super::{CaseType, ConfidenceTier, IntentAnalysis};

/// Word-count threshold above which a query is considered self-contained.
const HIGH_CONFIDENCE_WORDS: usize = 50;

/// Word-count threshold above which the general direction is assumed clear.
const MEDIUM_CONFIDENCE_WORDS: usize = 20;

/// Classifies a query into a case category by keyword matching and derives
/// confidence from query length.
///
/// Short queries get `Low` confidence with no needs list (the caller routes
/// those to clarification). Mid-length queries get the case-specific needs
/// list; long queries are treated as self-contained.
pub fn fallback_analysis(query: &str) -> IntentAnalysis {
    let lower = query.to_lowercase();
    let (case_type, intent) = classify_case(&lower);

    let mut facts_found = BTreeMap::new();
    if lower.contains("married") || lower.contains("marriage") {
        facts_found.insert("marriage_mentioned".to_string(), "yes".to_string());
    }
    if lower.contains("child") {
        facts_found.insert("children_mentioned".to_string(), "yes".to_string());
    }

    let word_count = query.split_whitespace().count();
    let (confidence, facts_still_needed) = if word_count > HIGH_CONFIDENCE_WORDS {
        (ConfidenceTier::High, vec![])
    } else if word_count > MEDIUM_CONFIDENCE_WORDS {
        (ConfidenceTier::Medium, case_type.needed_facts())
    } else {
        // Too vague to know what to ask; the low tier triggers clarification.
        (ConfidenceTier::Low, vec![])
    };

    tracing::info!(
        case_type = case_type.as_str(),
        confidence = ?confidence,
        "fallback analysis applied"
    );

    IntentAnalysis {
        intent,
        confidence,
        facts_found,
        facts_still_needed,
    }
}

fn classify_case(lower: &str) -> (CaseType, String) {
    const VIOLENCE: &[&str] = &["violence", "abuse", "beat", "assault", "hit", "threat"];
    const DOWRY: &[&str] = &["dowry", "dahej", "demand", "harassment"];
    const CUSTODY: &[&str] = &["custody", "children", "child", "visitation"];
    const DIVORCE: &[&str] = &["divorce", "separation", "marriage"];
    const MAINTENANCE: &[&str] = &["maintenance", "alimony", "support"];

    let contains_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if contains_any(VIOLENCE) {
        (
            CaseType::DomesticViolence,
            "Seeking help with domestic violence".to_string(),
        )
    } else if contains_any(DOWRY) {
        (
            CaseType::Dowry,
            "Seeking help with dowry-related issues".to_string(),
        )
    } else if contains_any(CUSTODY) {
        (
            CaseType::ChildCustody,
            "Seeking help with child custody".to_string(),
        )
    } else if contains_any(DIVORCE) {
        (
            CaseType::Divorce,
            "Seeking help with divorce/separation".to_string(),
        )
    } else if contains_any(MAINTENANCE) {
        (
            CaseType::Maintenance,
            "Seeking help with maintenance/alimony".to_string(),
        )
    } else {
        (CaseType::General, "Seeking family law advice".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn violence_keywords_map_to_domestic_violence() {
        let analysis = fallback_analysis("my husband hit me yesterday");
        assert!(analysis.intent.contains("domestic violence"));
    }

    #[test]
    fn dowry_keywords_map_to_dowry() {
        let analysis = fallback_analysis("my in-laws keep making dowry demands");
        assert!(analysis.intent.contains("dowry"));
    }

    #[test]
    fn custody_beats_divorce_when_both_present() {
        // Keyword precedence follows the closed category order.
        let analysis = fallback_analysis("after the separation who gets custody of the child");
        assert!(analysis.intent.contains("custody"));
    }

    #[test]
    fn unknown_topic_maps_to_general() {
        let analysis = fallback_analysis("I need advice about a property dispute with a neighbour");
        assert_eq!(analysis.intent, "Seeking family law advice");
    }

    #[test]
    fn short_query_gets_low_confidence_and_no_needs() {
        let analysis = fallback_analysis("divorce help");
        assert_eq!(analysis.confidence, ConfidenceTier::Low);
        assert!(analysis.facts_still_needed.is_empty());
    }

    #[test]
    fn mid_length_query_gets_medium_confidence_and_case_needs() {
        let query = "I want a divorce from my husband because things have not \
                     worked out between us for the past three years and I need \
                     to know my options";
        assert!(query.split_whitespace().count() > MEDIUM_CONFIDENCE_WORDS);
        let analysis = fallback_analysis(query);
        assert_eq!(analysis.confidence, ConfidenceTier::Medium);
        assert_eq!(analysis.facts_still_needed, CaseType::Divorce.needed_facts());
    }

    #[test]
    fn long_query_gets_high_confidence() {
        let query = "word ".repeat(HIGH_CONFIDENCE_WORDS + 5);
        let analysis = fallback_analysis(&query);
        assert_eq!(analysis.confidence, ConfidenceTier::High);
        assert!(analysis.facts_still_needed.is_empty());
    }

    #[test]
    fn marriage_and_children_mentions_become_facts() {
        let analysis = fallback_analysis("we got married in 2019 and have one child");
        assert_eq!(
            analysis.facts_found.get("marriage_mentioned"),
            Some(&"yes".to_string())
        );
        assert_eq!(
            analysis.facts_found.get("children_mentioned"),
            Some(&"yes".to_string())
        );
    }

    proptest! {
        // The fallback is the last line of defence; it must be total.
        #[test]
        fn never_panics_on_arbitrary_input(query in ".{0,500}") {
            let analysis = fallback_analysis(&query);
            prop_assert!(!analysis.intent.is_empty());
        }
    }
}
