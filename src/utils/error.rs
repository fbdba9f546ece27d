//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::fmt;
use thiserror::Error;

/// Which kind of area a broken or duplicated reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    State,
    County,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::State => write!(f, "state"),
            ReferenceKind::County => write!(f, "county"),
        }
    }
}

/// Fatal errors raised while building a snapshot
///
/// Any of these aborts the whole aggregation run; no snapshot is returned.
#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("Missing reference: {referrer} refers to unknown {kind} id {id}")]
    MissingReference {
        kind: ReferenceKind,
        id: u32,
        referrer: String,
    },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: ReferenceKind, id: u32 },
}

impl EngineError {
    /// Shorthand used by the builder and linker
    pub fn missing(kind: ReferenceKind, id: u32, referrer: impl Into<String>) -> Self {
        EngineError::MissingReference {
            kind,
            id,
            referrer: referrer.into(),
        }
    }
}

/// Errors that can occur while decoding the exchange documents
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid document format: {0}")]
    InvalidFormat(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Row {row} has {found} values but {expected} fields are declared")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row} is missing field '{field}'")]
    MissingField { row: usize, field: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to read file: {0}")]
    ReadFailed(std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
