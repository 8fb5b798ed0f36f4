//! Intent analysis result types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How confident the analyzer is that it understood the user's intent.
///
/// `Low` forces the clarification branch regardless of which facts are
/// still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Query is clear, specific, and self-contained.
    High,
    /// General direction is clear but detail is thin.
    #[default]
    Medium,
    /// Intent cannot be determined; clarification required.
    Low,
}

impl ConfidenceTier {
    /// Returns true if this tier forces a clarification turn.
    pub fn requires_clarification(&self) -> bool {
        matches!(self, Self::Low)
    }
}

/// Closed set of family-law case categories used by the fallback classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Divorce,
    DomesticViolence,
    ChildCustody,
    Dowry,
    Maintenance,
    General,
}

impl CaseType {
    /// Returns the snake_case label used in fact keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Divorce => "divorce",
            Self::DomesticViolence => "domestic_violence",
            Self::ChildCustody => "child_custody",
            Self::Dowry => "dowry",
            Self::Maintenance => "maintenance",
            Self::General => "general",
        }
    }

    /// Returns the critical fact keys typically needed for this case type.
    pub fn needed_facts(&self) -> Vec<String> {
        let keys: &[&str] = match self {
            Self::Divorce => &[
                "marriage_date",
                "grounds_for_divorce",
                "children_details",
                "property_details",
            ],
            Self::DomesticViolence => &[
                "current_safety_status",
                "incident_details",
                "relationship_to_perpetrator",
                "previous_complaints",
            ],
            Self::ChildCustody => &[
                "children_ages",
                "current_custody_arrangement",
                "reason_for_custody_change",
            ],
            Self::Dowry => &[
                "marriage_date",
                "dowry_demands_details",
                "evidence_available",
                "complaints_filed",
            ],
            Self::Maintenance => &[
                "marriage_duration",
                "income_details",
                "dependents",
                "current_financial_status",
            ],
            Self::General => &["detailed_situation", "timeline_of_events", "desired_outcome"],
        };
        keys.iter().map(|k| k.to_string()).collect()
    }
}

/// Result of analyzing a user query.
///
/// Produced by the primary structured-LLM path or, on any backend failure,
/// by the deterministic keyword fallback. Both paths only report facts that
/// are textually present in the query; nothing is fabricated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    /// Short description of what the user wants to achieve.
    pub intent: String,
    /// Confidence in the intent reading.
    pub confidence: ConfidenceTier,
    /// Facts already stated in the query, keyed by snake_case identifier.
    pub facts_found: BTreeMap<String, String>,
    /// Fact keys still outstanding, in the order they should be asked.
    pub facts_still_needed: Vec<String>,
}

/// Renders a fact key as a human-readable title, e.g. `marriage_date`
/// becomes `Marriage Date`.
pub(crate) fn titleize_key(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    mod confidence_tier {
        use super::*;

        #[test]
        fn only_low_requires_clarification() {
            assert!(ConfidenceTier::Low.requires_clarification());
            assert!(!ConfidenceTier::Medium.requires_clarification());
            assert!(!ConfidenceTier::High.requires_clarification());
        }

        #[test]
        fn deserializes_from_lowercase() {
            let tier: ConfidenceTier = serde_json::from_str("\"high\"").unwrap();
            assert_eq!(tier, ConfidenceTier::High);
        }
    }

    mod case_type {
        use super::*;

        #[test]
        fn every_case_type_has_needed_facts() {
            for case in [
                CaseType::Divorce,
                CaseType::DomesticViolence,
                CaseType::ChildCustody,
                CaseType::Dowry,
                CaseType::Maintenance,
                CaseType::General,
            ] {
                assert!(!case.needed_facts().is_empty());
            }
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&CaseType::DomesticViolence).unwrap();
            assert_eq!(json, "\"domestic_violence\"");
        }
    }

    mod titleize {
        use super::*;

        #[test]
        fn converts_snake_case_to_title() {
            assert_eq!(titleize_key("marriage_date"), "Marriage Date");
            assert_eq!(titleize_key("user_gender"), "User Gender");
            assert_eq!(titleize_key("incident"), "Incident");
        }
    }
}
