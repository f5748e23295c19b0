//! Unified error handling for the rotapress crate
//!
//! A single `Error` enum wraps all domain-specific failures so they can cross
//! module boundaries without losing detail. The `is_recoverable` classification
//! drives the run loop: recoverable failures skip a single topic, everything
//! else aborts the run.

use std::io;
use thiserror::Error;

/// Unified error type for the rotapress crate
#[derive(Error, Debug)]
pub enum Error {
    /// History state could not be persisted (fatal to the run)
    #[error("Failed to persist history state: {0}")]
    HistorySave(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Content generation failed for a topic
    #[error("Generation failed for topic '{topic}': {reason}")]
    Generation { topic: String, reason: String },

    /// Publishing failed for a post
    #[error("Publish failed for '{label}': {reason}")]
    Publish { label: String, reason: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generation error for a topic
    pub fn generation(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Generation {
            topic: topic.into(),
            reason: reason.into(),
        }
    }

    /// Create a publish error
    pub fn publish(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Publish {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is recoverable within a run
    ///
    /// Recoverable failures cost one topic; the run continues. A failed
    /// history save is never recoverable because silently losing state
    /// produces undetected duplicate publications on the next run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::HistorySave(_) => false,
            Self::Io(_) => false,
            Self::Json(_) => false,
            Self::Generation { .. } => true,
            Self::Publish { .. } => true,
            Self::Http(_) => true,
            Self::Config(_) => false,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_is_recoverable() {
        let err = Error::generation("finance", "model timeout");
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("finance"));
    }

    #[test]
    fn test_publish_error_is_recoverable() {
        let err = Error::publish("Finance Hot Take", "503");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_history_save_is_fatal() {
        let err = Error::HistorySave("disk full".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("articles_per_day must be at least 1");
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("articles_per_day"));
    }
}
