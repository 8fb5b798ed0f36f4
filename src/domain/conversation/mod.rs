//! Conversation domain - session aggregate, message log, turn state machine,
//! and the per-turn output envelope.

mod envelope;
mod message;
mod session;
mod turn_state;

pub use envelope::{ResponseKind, SourceRef, TurnOutput};
pub use message::{ConversationMessage, MessageRole};
pub use session::{ConversationSession, ADDITIONAL_INFO_KEY};
pub use turn_state::{route_after_analysis, TurnState};
