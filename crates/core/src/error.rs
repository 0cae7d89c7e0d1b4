//! Error taxonomy shared by every helpdesk crate.

use std::path::PathBuf;

/// Result alias for helpdesk operations.
pub type Result<T> = std::result::Result<T, HelpdeskError>;

/// Errors raised by the answering pipeline.
#[derive(Debug, thiserror::Error)]
pub enum HelpdeskError {
    /// The knowledge source could not be located
    #[error("knowledge source not found: {}", path.display())]
    SourceMissing {
        /// Location that was checked
        path: PathBuf,
    },

    /// Parsing produced zero question/answer entries
    #[error("no question/answer entries parsed from {source_name}")]
    NoEntriesParsed {
        /// Human readable name of the source
        source_name: String,
    },

    /// Backend unreachable, or every attempt timed out
    #[error("generation backend unreachable: {reason}")]
    Connection {
        /// What went wrong
        reason: String,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// Backend rejected the request or returned nothing usable
    #[error("generation failed: {message}")]
    Generation {
        /// Summary of the failure
        message: String,
        /// HTTP status, when the backend answered
        status: Option<u16>,
        /// Raw response body, when the backend answered
        body: Option<String>,
    },

    /// Unrecognized context selection method
    #[error("invalid selection method '{0}', expected one of: all, keyword")]
    InvalidSelectionMethod(String),

    /// A request parameter was out of range
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Settings could not be loaded or are inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while reading a knowledge source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`HelpdeskError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`HelpdeskError::SourceMissing`]
    SourceMissing,
    /// See [`HelpdeskError::NoEntriesParsed`]
    NoEntriesParsed,
    /// See [`HelpdeskError::Connection`]
    Connection,
    /// See [`HelpdeskError::Generation`]
    Generation,
    /// See [`HelpdeskError::InvalidSelectionMethod`]
    InvalidSelectionMethod,
    /// See [`HelpdeskError::InvalidRequest`]
    InvalidRequest,
    /// See [`HelpdeskError::Config`]
    Config,
    /// See [`HelpdeskError::Io`]
    Io,
}

impl HelpdeskError {
    /// Build a generation error from an HTTP status and body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Generation {
            message: format!("HTTP error from backend: {}", status),
            status: Some(status),
            body: Some(body.into()),
        }
    }

    /// Build a generation error that carries only a message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceMissing { .. } => ErrorKind::SourceMissing,
            Self::NoEntriesParsed { .. } => ErrorKind::NoEntriesParsed,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Generation { .. } => ErrorKind::Generation,
            Self::InvalidSelectionMethod(_) => ErrorKind::InvalidSelectionMethod,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether a caller should present this as a transient "service
    /// unavailable" condition and retry later.
    ///
    /// Missing sources and unreachable backends may recover on their own;
    /// rejections, empty knowledge bases and bad input will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::SourceMissing | ErrorKind::Connection)
    }
}
