//! Conversation session aggregate.
//!
//! One user's multi-turn interaction, carrying the message log, the
//! structured fact record, and the interview bookkeeping. All mutation goes
//! through methods that uphold the session invariants:
//!
//! - `current_question_target` is set iff a question was asked and its
//!   answer is still outstanding.
//! - `facts_needed` never contains a key already collected, and never
//!   contains duplicates.
//! - `gathering_active` and `sufficiency_reached` are mutually exclusive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::analysis::{titleize_key, ConfidenceTier};
use crate::domain::foundation::SessionId;

use super::{ConversationMessage, MessageRole};

/// Scratch fact key that absorbs replies the extractor could not attribute,
/// so no information the user volunteered is silently dropped.
pub const ADDITIONAL_INFO_KEY: &str = "additional_info";

/// One user's multi-turn consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    session_id: SessionId,
    root_query: String,
    current_query: String,
    message_log: Vec<ConversationMessage>,
    intent: Option<String>,
    intent_confidence_tier: ConfidenceTier,
    facts_collected: BTreeMap<String, String>,
    facts_needed: Vec<String>,
    gathering_active: bool,
    gathering_step: u32,
    current_question_target: Option<String>,
    pending_question_text: Option<String>,
    revalidation_active: bool,
    revalidation_attempts: u32,
    sufficiency_reached: bool,
    last_response: Option<String>,
}

impl ConversationSession {
    /// Creates a session from the first-turn query.
    ///
    /// The root query is immutable from this point on.
    pub fn new(session_id: SessionId, root_query: impl Into<String>) -> Self {
        let root_query = root_query.into();
        Self {
            session_id,
            current_query: root_query.clone(),
            root_query,
            message_log: Vec::new(),
            intent: None,
            intent_confidence_tier: ConfidenceTier::default(),
            facts_collected: BTreeMap::new(),
            facts_needed: Vec::new(),
            gathering_active: false,
            gathering_step: 0,
            current_question_target: None,
            pending_question_text: None,
            revalidation_active: false,
            revalidation_attempts: 0,
            sufficiency_reached: false,
            last_response: None,
        }
    }

    // ───────────────────────── accessors ─────────────────────────

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The original, unmodified first-turn query.
    pub fn root_query(&self) -> &str {
        &self.root_query
    }

    /// The latest turn's raw text.
    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    pub fn message_log(&self) -> &[ConversationMessage] {
        &self.message_log
    }

    pub fn intent(&self) -> Option<&str> {
        self.intent.as_deref()
    }

    pub fn confidence_tier(&self) -> ConfidenceTier {
        self.intent_confidence_tier
    }

    pub fn facts_collected(&self) -> &BTreeMap<String, String> {
        &self.facts_collected
    }

    pub fn facts_needed(&self) -> &[String] {
        &self.facts_needed
    }

    pub fn is_gathering_active(&self) -> bool {
        self.gathering_active
    }

    pub fn gathering_step(&self) -> u32 {
        self.gathering_step
    }

    pub fn current_question_target(&self) -> Option<&str> {
        self.current_question_target.as_deref()
    }

    pub fn pending_question_text(&self) -> Option<&str> {
        self.pending_question_text.as_deref()
    }

    pub fn is_revalidation_active(&self) -> bool {
        self.revalidation_active
    }

    pub fn revalidation_attempts(&self) -> u32 {
        self.revalidation_attempts
    }

    pub fn sufficiency_reached(&self) -> bool {
        self.sufficiency_reached
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// True until the first user message is logged.
    pub fn is_first_turn(&self) -> bool {
        !self.message_log.iter().any(ConversationMessage::is_user)
    }

    // ───────────────────────── turn lifecycle ─────────────────────────

    /// Starts a turn: records the user message and replaces the current
    /// query. The root query is never touched.
    pub fn begin_turn(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.current_query = query.clone();
        self.message_log.push(ConversationMessage::user(query));
    }

    /// Records the assistant's reply for this turn.
    pub fn record_assistant_response(&mut self, text: impl Into<String>) {
        self.message_log.push(ConversationMessage::assistant(text));
    }

    /// Remembers the most recent final advice for follow-up classification.
    pub fn set_last_response(&mut self, text: impl Into<String>) {
        self.last_response = Some(text.into());
    }

    /// Returns the last `count` log messages as (role, text) pairs for
    /// prompt context.
    pub fn recent_messages(&self, count: usize) -> Vec<(MessageRole, &str)> {
        let skip = self.message_log.len().saturating_sub(count);
        self.message_log[skip..]
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect()
    }

    // ───────────────────────── analysis results ─────────────────────────

    /// Records the analyzer's intent reading.
    pub fn set_intent(&mut self, intent: impl Into<String>, tier: ConfidenceTier) {
        self.intent = Some(intent.into());
        self.intent_confidence_tier = tier;
    }

    /// Merges analyzer-found facts, overwriting on key collision (the
    /// correction path relies on this). Collected keys are dropped from the
    /// needs list.
    pub fn merge_facts(&mut self, facts: BTreeMap<String, String>) {
        for (key, value) in facts {
            self.facts_collected.insert(key.clone(), value);
            self.facts_needed.retain(|k| k != &key);
        }
    }

    /// Replaces the needs list with a fresh analysis result, dropping keys
    /// already collected and de-duplicating while preserving order.
    pub fn replace_needed(&mut self, keys: Vec<String>) {
        self.facts_needed.clear();
        self.queue_needed_facts(keys);
    }

    /// Appends fact keys to the needs list (set union, FIFO order kept).
    /// Keys already collected or already queued are skipped.
    pub fn queue_needed_facts(&mut self, keys: impl IntoIterator<Item = String>) {
        for key in keys {
            if self.facts_collected.contains_key(&key) {
                continue;
            }
            if self.facts_needed.contains(&key) {
                continue;
            }
            self.facts_needed.push(key);
        }
    }

    // ───────────────────────── gathering ─────────────────────────

    /// Stores an extracted answer and retires its key from the needs list.
    pub fn record_fact(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.facts_collected.insert(key.clone(), value.into());
        self.facts_needed.retain(|k| k != &key);
    }

    /// Folds an unattributable reply into the scratch fact so nothing the
    /// user said is lost.
    pub fn append_additional_info(&mut self, raw_reply: &str) {
        let trimmed = raw_reply.trim();
        if trimmed.is_empty() {
            return;
        }
        match self.facts_collected.get_mut(ADDITIONAL_INFO_KEY) {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(trimmed);
            }
            None => {
                self.facts_collected
                    .insert(ADDITIONAL_INFO_KEY.to_string(), trimmed.to_string());
            }
        }
    }

    /// Next outstanding fact key, if any.
    pub fn peek_needed(&self) -> Option<&str> {
        self.facts_needed.first().map(String::as_str)
    }

    /// Removes a key from the needs list without recording a fact.
    pub fn drop_needed(&mut self, key: &str) {
        self.facts_needed.retain(|k| k != key);
    }

    /// Records that a question was asked: sets the answer-attribution
    /// fields and consumes one interview step.
    pub fn note_question_asked(&mut self, target: impl Into<String>, question: impl Into<String>) {
        self.current_question_target = Some(target.into());
        self.pending_question_text = Some(question.into());
        self.gathering_step += 1;
        self.gathering_active = true;
        self.sufficiency_reached = false;
    }

    /// Clears the answer-attribution fields once a reply was consumed.
    pub fn clear_pending_question(&mut self) {
        self.current_question_target = None;
        self.pending_question_text = None;
    }

    /// Ends the interview without declaring sufficiency (revalidation will
    /// decide that).
    pub fn finish_gathering(&mut self) {
        self.gathering_active = false;
        self.clear_pending_question();
    }

    // ───────────────────────── revalidation / sufficiency ─────────────────────────

    /// Counts one revalidation pass.
    pub fn record_revalidation_attempt(&mut self) {
        self.revalidation_attempts += 1;
    }

    /// Reopens the interview after revalidation found new gaps.
    pub fn reopen_gathering(&mut self) {
        self.gathering_active = true;
        self.revalidation_active = true;
        self.sufficiency_reached = false;
    }

    /// Declares the fact record sufficient for retrieval. Mutually
    /// exclusive with an active interview.
    pub fn mark_sufficient(&mut self) {
        self.sufficiency_reached = true;
        self.gathering_active = false;
        self.revalidation_active = false;
        self.clear_pending_question();
    }

    /// Resets the analysis bookkeeping for a brand-new question while
    /// keeping the facts already collected.
    pub fn reset_for_new_question(&mut self) {
        self.intent = None;
        self.intent_confidence_tier = ConfidenceTier::default();
        self.facts_needed.clear();
        self.gathering_active = false;
        self.gathering_step = 0;
        self.revalidation_active = false;
        self.revalidation_attempts = 0;
        self.sufficiency_reached = false;
        self.clear_pending_question();
    }

    // ───────────────────────── renderings ─────────────────────────

    /// Human-readable rendering of the collected facts, one per line.
    pub fn facts_rendering(&self) -> String {
        if self.facts_collected.is_empty() {
            return "No information collected yet.".to_string();
        }
        self.facts_collected
            .iter()
            .map(|(k, v)| format!("- {}: {}", titleize_key(k), v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The synthetic composite query revalidation re-analyzes: the root
    /// query plus everything collected since.
    pub fn composite_query(&self) -> String {
        if self.facts_collected.is_empty() {
            return self.root_query.clone();
        }
        format!(
            "{}\n\nDetails provided so far:\n{}",
            self.root_query,
            self.facts_rendering()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ConversationSession {
        ConversationSession::new(
            SessionId::new("test-session").unwrap(),
            "I want a divorce from my husband",
        )
    }

    mod turn_lifecycle {
        use super::*;

        #[test]
        fn root_query_is_set_once_and_kept() {
            let mut s = session();
            s.begin_turn("I want a divorce from my husband");
            s.begin_turn("we married in 2015");
            assert_eq!(s.root_query(), "I want a divorce from my husband");
            assert_eq!(s.current_query(), "we married in 2015");
        }

        #[test]
        fn message_log_is_append_only_in_order() {
            let mut s = session();
            s.begin_turn("first");
            s.record_assistant_response("question?");
            s.begin_turn("answer");
            let roles: Vec<_> = s.message_log().iter().map(|m| m.role).collect();
            assert_eq!(
                roles,
                vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
            );
        }

        #[test]
        fn first_turn_detection() {
            let mut s = session();
            assert!(s.is_first_turn());
            s.begin_turn("hello");
            assert!(!s.is_first_turn());
        }

        #[test]
        fn recent_messages_returns_tail() {
            let mut s = session();
            for i in 0..6 {
                s.begin_turn(format!("m{i}"));
            }
            let recent = s.recent_messages(4);
            assert_eq!(recent.len(), 4);
            assert_eq!(recent[0].1, "m2");
            assert_eq!(recent[3].1, "m5");
        }
    }

    mod fact_invariants {
        use super::*;

        #[test]
        fn record_fact_retires_key_from_needs() {
            let mut s = session();
            s.queue_needed_facts(vec!["marriage_date".into(), "user_gender".into()]);
            s.record_fact("marriage_date", "2015");
            assert_eq!(s.facts_needed(), ["user_gender".to_string()]);
            assert_eq!(
                s.facts_collected().get("marriage_date"),
                Some(&"2015".to_string())
            );
        }

        #[test]
        fn queue_skips_collected_and_duplicate_keys() {
            let mut s = session();
            s.record_fact("marriage_date", "2015");
            s.queue_needed_facts(vec![
                "marriage_date".into(),
                "user_gender".into(),
                "user_gender".into(),
            ]);
            assert_eq!(s.facts_needed(), ["user_gender".to_string()]);
        }

        #[test]
        fn merge_facts_overwrites_on_collision() {
            let mut s = session();
            s.record_fact("marriage_date", "2019");
            let mut correction = BTreeMap::new();
            correction.insert("marriage_date".to_string(), "2020".to_string());
            s.merge_facts(correction);
            assert_eq!(
                s.facts_collected().get("marriage_date"),
                Some(&"2020".to_string())
            );
        }

        #[test]
        fn additional_info_accumulates_with_separator() {
            let mut s = session();
            s.append_additional_info("I live in Pune");
            s.append_additional_info("the house is rented");
            assert_eq!(
                s.facts_collected().get(ADDITIONAL_INFO_KEY),
                Some(&"I live in Pune; the house is rented".to_string())
            );
        }

        #[test]
        fn additional_info_ignores_blank_replies() {
            let mut s = session();
            s.append_additional_info("   ");
            assert!(s.facts_collected().is_empty());
        }
    }

    mod gathering_bookkeeping {
        use super::*;

        #[test]
        fn question_sets_attribution_and_consumes_step() {
            let mut s = session();
            s.note_question_asked("user_gender", "Are you the wife or the husband?");
            assert_eq!(s.current_question_target(), Some("user_gender"));
            assert_eq!(
                s.pending_question_text(),
                Some("Are you the wife or the husband?")
            );
            assert_eq!(s.gathering_step(), 1);
            assert!(s.is_gathering_active());
        }

        #[test]
        fn clearing_pending_question_resets_attribution() {
            let mut s = session();
            s.note_question_asked("user_gender", "q");
            s.clear_pending_question();
            assert!(s.current_question_target().is_none());
            assert!(s.pending_question_text().is_none());
        }

        #[test]
        fn gathering_and_sufficiency_are_mutually_exclusive() {
            let mut s = session();
            s.note_question_asked("user_gender", "q");
            assert!(s.is_gathering_active() && !s.sufficiency_reached());

            s.mark_sufficient();
            assert!(!s.is_gathering_active() && s.sufficiency_reached());

            s.reopen_gathering();
            assert!(s.is_gathering_active() && !s.sufficiency_reached());
        }

        #[test]
        fn mark_sufficient_clears_pending_question() {
            let mut s = session();
            s.note_question_asked("user_gender", "q");
            s.mark_sufficient();
            assert!(s.current_question_target().is_none());
        }
    }

    mod new_question_reset {
        use super::*;

        #[test]
        fn reset_keeps_facts_but_clears_interview_state() {
            let mut s = session();
            s.set_intent("divorce", ConfidenceTier::High);
            s.record_fact("marriage_date", "2015");
            s.queue_needed_facts(vec!["user_gender".into()]);
            s.note_question_asked("user_gender", "q");
            s.record_revalidation_attempt();

            s.reset_for_new_question();

            assert!(s.intent().is_none());
            assert_eq!(s.facts_collected().len(), 1);
            assert!(s.facts_needed().is_empty());
            assert_eq!(s.gathering_step(), 0);
            assert_eq!(s.revalidation_attempts(), 0);
            assert!(!s.is_gathering_active());
        }
    }

    mod renderings {
        use super::*;

        #[test]
        fn facts_rendering_titleizes_keys() {
            let mut s = session();
            s.record_fact("marriage_date", "2015");
            assert_eq!(s.facts_rendering(), "- Marriage Date: 2015");
        }

        #[test]
        fn composite_query_without_facts_is_root_query() {
            let s = session();
            assert_eq!(s.composite_query(), s.root_query());
        }

        #[test]
        fn composite_query_includes_fact_lines() {
            let mut s = session();
            s.record_fact("marriage_date", "2015");
            let composite = s.composite_query();
            assert!(composite.starts_with(s.root_query()));
            assert!(composite.contains("Marriage Date: 2015"));
        }
    }

    mod persistence {
        use super::*;

        #[test]
        fn snapshot_round_trips_all_machine_state() {
            let mut s = session();
            s.begin_turn("I want a divorce from my husband");
            s.set_intent("divorce", ConfidenceTier::Medium);
            s.record_fact("marriage_date", "2015");
            s.queue_needed_facts(vec!["user_gender".into()]);
            s.note_question_asked("user_gender", "Are you the wife or the husband?");
            s.record_assistant_response("Are you the wife or the husband?");
            s.record_revalidation_attempt();

            let json = serde_json::to_string(&s).unwrap();
            let restored: ConversationSession = serde_json::from_str(&json).unwrap();
            assert_eq!(restored, s);
        }
    }
}
