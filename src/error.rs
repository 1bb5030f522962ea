//! SafeMask error types

use thiserror::Error;

/// SafeMask error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A recognizer pattern failed to compile
    #[error("Invalid pattern for recognizer '{recognizer}': {source}")]
    Pattern {
        recognizer: String,
        #[source]
        source: regex::Error,
    },

    /// A detector raised or produced a malformed result
    #[error("Detector '{detector}' failed: {message}")]
    Detector { detector: String, message: String },

    /// A span violates the offset invariants of the text it refers to
    #[error("Invalid span {start}..{end}: {reason}")]
    InvalidSpan {
        start: usize,
        end: usize,
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Shorthand for a detector failure.
    pub fn detector(detector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Detector {
            detector: detector.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for SafeMask operations
pub type Result<T> = std::result::Result<T, Error>;
