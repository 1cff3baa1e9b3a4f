//! Error types for validation, table operations and persistence.

use std::io;

/// A record was rejected before any mutation took place.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid record key {key:?}")]
    InvalidKey { key: String },

    #[error("invalid {field} format")]
    InvalidFormat { field: &'static str },

    #[error("{field} {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// `update(key, record)` with a record carrying a different key.
    #[error("record key {found:?} does not match target key {expected:?}")]
    KeyMismatch { expected: String, found: String },
}

/// Failure of a table operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The growth target could not be computed or allocated. The table is
    /// left exactly as it was before the call.
    #[error("cannot grow bucket array to {requested} buckets")]
    CapacityOverflow { requested: usize },

    #[error("invalid table configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl TableError {
    /// The validation error, if this is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            TableError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// A single line of a data file could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected at least {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },

    #[error("field {field}: {value:?} is not a number")]
    BadNumber { field: &'static str, value: String },

    #[error("field {field}: no variant with index {value:?}")]
    BadVariant { field: &'static str, value: String },

    #[error("hire date {0} is out of range")]
    BadTimestamp(i64),
}

/// Whole-file persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed header in {path}: {line:?}")]
    Header { path: String, line: String },
}

/// Why one record of a bulk load was skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadIssue {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Rejected(#[from] TableError),
}

impl LoadIssue {
    /// The validation error, if the table rejected the record on validation.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            LoadIssue::Rejected(e) => e.validation(),
            LoadIssue::Parse(_) => None,
        }
    }
}
