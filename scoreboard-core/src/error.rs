//! Error types for scoreboard operations

use crate::EntityType;
use thiserror::Error;

/// Local validation failures. Raised before any backend call; the entity
/// store is never touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("A {entity_type} name is required")]
    RequiredName { entity_type: EntityType },

    #[error("A {entity_type} named \"{name}\" already exists")]
    DuplicateName { entity_type: EntityType, name: String },

    #[error("Invalid max score {value}: must be >= 0")]
    InvalidMaxScore { value: i64 },

    #[error("Unknown challenge: {id}")]
    UnknownChallenge { id: String },

    #[error("Unknown person: {id}")]
    UnknownPerson { id: String },
}

/// Failures reported by (or while talking to) the backend. Messages from the
/// backend are passed through verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("{operation} rejected: {message}")]
    Rejected { operation: String, message: String },

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("Transport failure during {operation}: {message}")]
    Transport { operation: String, message: String },

    #[error("Could not decode {operation} response: {message}")]
    Decode { operation: String, message: String },

    #[error("Not signed in")]
    NotSignedIn,
}

impl BackendError {
    pub fn rejected(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// The message to show the user.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Master error type for all scoreboard errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoreboardError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl ScoreboardError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ScoreboardError::Validation(_))
    }
}

/// Result type alias for scoreboard operations.
pub type ScoreboardResult<T> = Result<T, ScoreboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_duplicate() {
        let err = ValidationError::DuplicateName {
            entity_type: EntityType::Challenge,
            name: "Quiz".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("challenge"));
        assert!(msg.contains("Quiz"));
    }

    #[test]
    fn test_backend_error_message_passthrough() {
        let err = BackendError::rejected("insert challenge", "duplicate key value");
        assert_eq!(err.user_message(), "duplicate key value");

        let timeout = BackendError::Timeout {
            operation: "load".to_string(),
            after_ms: 12000,
        };
        assert!(timeout.user_message().contains("12000"));
    }

    #[test]
    fn test_scoreboard_error_from_variants() {
        let validation = ScoreboardError::from(ValidationError::RequiredName {
            entity_type: EntityType::Person,
        });
        assert!(validation.is_validation());

        let backend = ScoreboardError::from(BackendError::NotSignedIn);
        assert!(matches!(backend, ScoreboardError::Backend(_)));
        assert!(!backend.is_validation());
    }
}
