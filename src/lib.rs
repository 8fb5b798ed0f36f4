//! Nyaya Mitra - Family Law Consultation Assistant
//!
//! Multi-turn, retrieval-augmented legal assistant for Indian family-law
//! matters. The core is a conversation state machine that interviews the
//! user, decides when enough case information has been collected, retrieves
//! similar precedent cases, and generates structured legal guidance.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
