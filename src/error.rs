//! Error types for the movetree crate

use thiserror::Error;

/// Main error type for the movetree crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("node '{id}' not found")]
    NotFound { id: String },

    #[error("malformed tree payload: {message}")]
    FormatError { message: String },

    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("invalid tree: {reason}")]
    InvalidTree { reason: String },

    #[error("illegal move '{request}': {reason}")]
    IllegalMove { request: String, reason: String },

    #[error(
        "concurrent mutation of node '{parent}': expected {expected} children, found {found}"
    )]
    Conflict {
        parent: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid position '{position}': {reason}")]
    InvalidPosition { position: String, reason: String },

    #[error("invalid move code '{input}' (expected coordinate form such as 'e2e4' or 'e7e8q')")]
    InvalidMoveCode { input: String },

    #[error("session '{session}' is not active")]
    UnknownSession { session: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Error::NotFound { id: id.into() }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Error::FormatError {
            message: message.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Error::MissingField {
            field: field.into(),
        }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
