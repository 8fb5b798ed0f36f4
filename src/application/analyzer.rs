//! Intent analysis over the user's query.
//!
//! One structured model call identifies the legal intent, a confidence
//! tier, the facts already stated, and the facts still needed. Any backend
//! or parse failure drops to the deterministic keyword classifier, so this
//! component never errors and never mutates long-lived state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::domain::analysis::{
    fallback_analysis, parse_typed, ConfidenceTier, IntentAnalysis,
};
use crate::ports::{CompletionRequest, LanguageModel, PromptRole};

const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are a legal query analyzer for Indian family law. Respond ONLY with valid JSON.";

const ANALYSIS_PROMPT: &str = r#"Analyze the user's family-law query.

Your task:
1. Identify the PRIMARY legal intent (what they want help with)
2. Assess confidence in understanding their intent (high/medium/low)
3. Extract the information the user HAS PROVIDED (gender, dates, relationships, incidents)
4. List the most CRITICAL information STILL NEEDED to answer without assumptions
5. The gender of the person asking is always required for accurate advice.

Rules:
- Extract only what is textually present; never invent values
- Use specific snake_case keys (e.g. "marriage_date", not "details")
- If the user provided comprehensive details, set "info_needed": []
- If the query is too vague to classify, set confidence to "low"

Respond with JSON only:
{
  "user_intent": "brief description",
  "intent_confidence": "high|medium|low",
  "info_provided": {"key": "value"},
  "info_needed": ["key_1", "key_2"]
}
"#;

/// Wire shape of the analysis payload.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    user_intent: String,
    #[serde(default)]
    intent_confidence: Option<ConfidenceTier>,
    #[serde(default)]
    info_provided: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    info_needed: Vec<String>,
}

/// Analyzes queries into intent, confidence, and information needs.
#[derive(Clone)]
pub struct IntentAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl IntentAnalyzer {
    /// Creates an analyzer backed by the given model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Analyzes a query against the facts already known.
    ///
    /// Total function: falls back to keyword classification on any backend
    /// or parse failure.
    pub async fn analyze(
        &self,
        query: &str,
        prior_facts: &BTreeMap<String, String>,
    ) -> IntentAnalysis {
        let prompt = self.build_prompt(query, prior_facts);
        let request = CompletionRequest::new()
            .with_system_prompt(ANALYSIS_SYSTEM_PROMPT)
            .with_message(PromptRole::User, prompt)
            .with_max_tokens(1024);

        let response = match self.model.complete(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "analysis call failed, using keyword fallback");
                return fallback_analysis(query);
            }
        };

        match parse_typed::<RawAnalysis>(&response.content) {
            Ok(raw) => {
                let analysis = Self::from_raw(raw);
                tracing::info!(
                    intent = %analysis.intent,
                    confidence = ?analysis.confidence,
                    needed = analysis.facts_still_needed.len(),
                    "query analyzed"
                );
                analysis
            }
            Err(err) => {
                tracing::warn!(error = %err, "analysis payload unusable, using keyword fallback");
                fallback_analysis(query)
            }
        }
    }

    fn build_prompt(&self, query: &str, prior_facts: &BTreeMap<String, String>) -> String {
        let mut prompt = format!("{ANALYSIS_PROMPT}\nUSER QUERY:\n{query}\n");
        if !prior_facts.is_empty() {
            let known = prior_facts
                .iter()
                .map(|(k, v)| format!("- {k}: {v}"))
                .collect::<Vec<_>>()
                .join("\n");
            prompt.push_str(&format!(
                "\nALREADY KNOWN (do not list these as needed):\n{known}\n"
            ));
        }
        prompt.push_str("\nANALYSIS (JSON only):");
        prompt
    }

    fn from_raw(raw: RawAnalysis) -> IntentAnalysis {
        let facts_found = raw
            .info_provided
            .into_iter()
            .map(|(k, v)| (k, stringify(v)))
            .collect();
        IntentAnalysis {
            intent: if raw.user_intent.trim().is_empty() {
                "Seeking family law advice".to_string()
            } else {
                raw.user_intent
            },
            confidence: raw.intent_confidence.unwrap_or_default(),
            facts_found,
            facts_still_needed: raw.info_needed,
        }
    }
}

/// Renders a JSON fact value as a plain string fact.
fn stringify(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
