//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Maximum accepted length for externally-assigned session identifiers.
const MAX_SESSION_ID_LENGTH: usize = 100;

/// Opaque identifier for a consultation session.
///
/// Session ids are assigned by the caller (the API layer or CLI), not
/// generated here, so this is a validated string rather than a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id from an externally-assigned string.
    ///
    /// The value is trimmed; empty or over-long values are rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("session_id"));
        }
        if trimmed.len() > MAX_SESSION_ID_LENGTH {
            return Err(ValidationError::too_long("session_id", MAX_SESSION_ID_LENGTH));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Unique identifier for a message in the conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random MessageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a MessageId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod session_id {
        use super::*;

        #[test]
        fn accepts_plain_identifier() {
            let id = SessionId::new("conv_20250101_120000").unwrap();
            assert_eq!(id.as_str(), "conv_20250101_120000");
        }

        #[test]
        fn trims_surrounding_whitespace() {
            let id = SessionId::new("  abc  ").unwrap();
            assert_eq!(id.as_str(), "abc");
        }

        #[test]
        fn rejects_empty() {
            assert!(SessionId::new("").is_err());
            assert!(SessionId::new("   ").is_err());
        }

        #[test]
        fn rejects_over_long() {
            let long = "x".repeat(MAX_SESSION_ID_LENGTH + 1);
            assert!(SessionId::new(long).is_err());
        }

        #[test]
        fn serializes_transparently() {
            let id = SessionId::new("abc").unwrap();
            assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        }
    }

    mod message_id {
        use super::*;

        #[test]
        fn new_ids_are_unique() {
            assert_ne!(MessageId::new(), MessageId::new());
        }

        #[test]
        fn round_trips_through_uuid() {
            let id = MessageId::new();
            assert_eq!(MessageId::from_uuid(*id.as_uuid()), id);
        }
    }
}
