//! Timetable store error types.

use std::path::PathBuf;

/// Errors that can occur when reading from the timetable store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A timetable file could not be opened or read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be decoded into its record type
    #[error("malformed row in {table}: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    /// A decoded row holds a value that fails validation
    #[error("invalid {field} in {table} row {row}: {reason}")]
    InvalidField {
        table: &'static str,
        row: usize,
        field: &'static str,
        reason: String,
    },

    /// A row references an entity missing from another table
    #[error("{table} row {row} references unknown {field} {value}")]
    UnknownReference {
        table: &'static str,
        row: usize,
        field: &'static str,
        value: String,
    },

    /// The store could not answer right now
    #[error("timetable store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether retrying the same query might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Unavailable(_))
    }
}
