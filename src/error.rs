//! Error handling for anchor-replay
//!
//! This module defines the crate-wide error type and a Result alias.
//! Conversion and decode failures are meant to be swallowed at the smallest
//! granularity (one target, one file); only explicitly requested operations
//! surface them to the caller.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::Session;

/// Main error type for anchor-replay operations
#[derive(Error, Debug)]
pub enum AnchorError {
    /// A persisted session could not be decoded
    #[error("Data corrupt: {0}")]
    DataCorrupt(String),

    /// Reading or writing a recording on disk failed
    #[error("Storage error at {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnchorError>,
    },
}

impl AnchorError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnchorError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a storage error for the given path
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnchorError::Storage {
            path: path.into(),
            source,
        }
    }

    /// Whether this error (or the error it wraps) is a decode failure
    pub fn is_data_corrupt(&self) -> bool {
        match self {
            AnchorError::DataCorrupt(_) => true,
            AnchorError::WithContext { source, .. } => source.is_data_corrupt(),
            _ => false,
        }
    }
}

/// A stopped recording that could not be written
///
/// Carries the detached session so the caller can retry somewhere else.
#[derive(Error, Debug)]
#[error("Failed to save recording of {} frames", session.frame_count())]
pub struct SaveError {
    #[source]
    pub error: AnchorError,
    pub session: Session,
}

impl SaveError {
    /// Take back the session that was not saved
    pub fn into_session(self) -> Session {
        self.session
    }
}

impl From<SaveError> for AnchorError {
    fn from(err: SaveError) -> Self {
        err.error
    }
}

/// Result type alias for anchor-replay operations
pub type Result<T> = std::result::Result<T, AnchorError>;

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
