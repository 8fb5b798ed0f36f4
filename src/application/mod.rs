//! Application layer - the conversation controllers and per-turn orchestration.

mod analyzer;
mod extractor;
mod followup;
mod gathering;
mod generation;
mod question;
mod revalidation;
mod turn;

pub use analyzer::IntentAnalyzer;
pub use extractor::{AnswerExtractor, ExtractedAnswer};
pub use followup::{FollowupClassification, FollowupClassifier, FollowupIntent};
pub use gathering::{GatherOutcome, GatheringController};
pub use generation::AdviceGenerator;
pub use question::QuestionGenerator;
pub use revalidation::{RevalidationController, RevalidationOutcome};
pub use turn::{TurnError, TurnOptions, TurnProcessor};
