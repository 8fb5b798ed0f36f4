//! Domain layer - core types and logic for the consultation assistant.

pub mod analysis;
pub mod conversation;
pub mod foundation;
pub mod gathering;
