//! Metadata CSV import/export.
//!
//! The metadata file is a flat, unquoted, comma-separated table. Parsing keeps
//! the raw row text so that columns the engine does not own survive a save
//! untouched; only the `label` and `comment` cells are rewritten.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labelgrid::format::{Dataset, serialize};
//!
//! let dataset = Dataset::parse(&text, &config, &registry)?;
//! let out = serialize(&dataset.document, &marks, &comments);
//! ```

mod csv;
mod dataset;
mod error;

pub use csv::{ColumnIndex, CsvDocument, find_column, parse, serialize, split_row};
pub use dataset::Dataset;
pub use error::FormatError;
