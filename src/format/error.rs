//! Error types for metadata CSV operations.

use thiserror::Error;

/// Errors that can occur while reading the metadata CSV.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The document has no header row
    #[error("CSV file is empty")]
    Empty,

    /// A required column is not present in the header row
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// Name of the missing column
        column: String,
    },
}

impl FormatError {
    /// Create a missing column error.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}
