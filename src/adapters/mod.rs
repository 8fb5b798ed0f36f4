//! Adapters - concrete implementations of the ports.

pub mod http;
pub mod llm;
pub mod retrieval;
pub mod storage;
