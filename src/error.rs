//! Error handling for serialvis
//!
//! This module defines the crate error type and a Result alias used
//! throughout the pipeline and its collaborators.
//!
//! Protocol violations (duplicate connect, channel-count mismatch between an
//! announcement and a pack) are *not* represented here — those are programming
//! errors in a collaborator and fail fast with an assertion instead.

use thiserror::Error;

/// Main error type for serialvis operations
#[derive(Error, Debug)]
pub enum SerialVisError {
    /// Storage could not be represented or allocated
    #[error("allocation of {requested} samples failed")]
    Allocation { requested: usize },

    /// Logical sample index past the retained window
    #[error("sample index {index} out of range (size {size})")]
    SampleOutOfRange { index: usize, size: usize },

    /// Channel index past the current channel count
    #[error("channel {index} out of range ({count} channels)")]
    ChannelOutOfRange { index: usize, count: usize },

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to decoding the incoming byte stream
    #[error("Decode error: {0}")]
    Decode(String),

    /// Errors related to the serial device
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SerialVisError>,
    },
}

impl SerialVisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SerialVisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for serialvis operations
pub type Result<T> = std::result::Result<T, SerialVisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
