//! Query analysis types and deterministic fallback classification.

mod fallback;
mod intent;
mod structured;

pub use fallback::fallback_analysis;
pub use intent::{CaseType, ConfidenceTier, IntentAnalysis};
pub use structured::{parse_json_payload, parse_typed, ParseFailure};

pub(crate) use intent::titleize_key;
