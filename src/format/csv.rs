//! Flat CSV codec for the metadata file.
//!
//! Not a general CSV implementation: fields are split on every comma and no
//! quoting or escaping is recognized.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::error::FormatError;
use crate::constants::{COMMENT_COLUMN, FILENAME_COLUMN, LABEL_COLUMN, NO_LABEL_NAME};
use crate::model::Mark;

/// A parsed metadata file that still holds the raw row text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    /// Header names, trimmed
    pub headers: Vec<String>,
    /// Header row as written
    pub header_line: String,
    /// Non-blank data rows as written, without line terminators
    pub data_lines: Vec<String>,
    /// Line terminator of the source (`"\n"` or `"\r\n"`)
    pub line_ending: &'static str,
    /// Whether the source ended with a line terminator
    pub trailing_newline: bool,
}

impl CsvDocument {
    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.data_lines.len()
    }

    /// Trimmed value of a cell, if the row and column exist.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.data_lines
            .get(row)
            .and_then(|line| split_row(line).get(column).copied())
            .map(str::trim)
    }
}

/// Where the columns the engine cares about live in the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    /// The required `filename` column
    pub filename: usize,
    /// The `label` column, if present
    pub label: Option<usize>,
    /// The `comment` column, if present
    pub comment: Option<usize>,
    /// Enabled metadata columns that were found, keyed by configured name
    pub metadata: IndexMap<String, usize>,
}

/// Split a row into its raw (untrimmed) cells.
pub fn split_row(line: &str) -> Vec<&str> {
    line.split(',').collect()
}

/// Position of a column, matching the header name case-insensitively.
pub fn find_column(headers: &[String], name: &str) -> Option<usize> {
    let wanted = name.to_lowercase();
    headers.iter().position(|h| h.to_lowercase() == wanted)
}

/// Parse a metadata document and locate its columns.
///
/// Blank lines are dropped; the first remaining line is the header row.
/// `metadata_columns` are the enabled metadata column names; those missing
/// from the header are skipped. Fails if there is no `filename` column.
pub fn parse<'a>(
    text: &str,
    metadata_columns: impl IntoIterator<Item = &'a str>,
) -> Result<(CsvDocument, ColumnIndex), FormatError> {
    let mut crlf = false;
    let mut lines = text
        .split('\n')
        .map(|line| match line.strip_suffix('\r') {
            Some(stripped) => {
                crlf = true;
                stripped
            }
            None => line,
        })
        .filter(|line| !line.trim().is_empty())
        .map(String::from);

    let header_line = lines.next().ok_or(FormatError::Empty)?;
    let data_lines: Vec<String> = lines.collect();
    let headers: Vec<String> = split_row(&header_line)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let filename = find_column(&headers, FILENAME_COLUMN)
        .ok_or_else(|| FormatError::missing_column(FILENAME_COLUMN))?;
    let label = find_column(&headers, LABEL_COLUMN);
    let comment = find_column(&headers, COMMENT_COLUMN);

    let mut metadata = IndexMap::new();
    for name in metadata_columns {
        if name.eq_ignore_ascii_case(LABEL_COLUMN) || name.eq_ignore_ascii_case(COMMENT_COLUMN) {
            continue;
        }
        match find_column(&headers, name) {
            Some(index) => {
                metadata.insert(name.to_string(), index);
            }
            None => log::debug!("Metadata column '{}' not in CSV, skipping", name),
        }
    }

    log::debug!(
        "Parsed CSV: {} columns, {} rows, filename={}, label={:?}, comment={:?}",
        headers.len(),
        data_lines.len(),
        filename,
        label,
        comment
    );

    let document = CsvDocument {
        headers,
        header_line,
        data_lines,
        line_ending: if crlf { "\r\n" } else { "\n" },
        trailing_newline: text.ends_with('\n'),
    };
    let columns = ColumnIndex {
        filename,
        label,
        comment,
        metadata,
    };
    Ok((document, columns))
}

/// Write the document back with the current marks and comments.
///
/// The `label` column is appended when missing; the `comment` column is
/// appended when missing and at least one comment exists. Every label cell
/// gets the mark's name (or "No label"), every comment cell the stored
/// comment (or nothing). Short rows are padded; all other cells are written
/// exactly as read.
pub fn serialize(
    document: &CsvDocument,
    marks: &BTreeMap<usize, Mark>,
    comments: &BTreeMap<usize, String>,
) -> String {
    let mut header_cells: Vec<&str> = split_row(&document.header_line);
    let header_width = header_cells.len();

    let label_column = match find_column(&document.headers, LABEL_COLUMN) {
        Some(index) => index,
        None => {
            header_cells.push(LABEL_COLUMN);
            header_cells.len() - 1
        }
    };
    let comment_column = match find_column(&document.headers, COMMENT_COLUMN) {
        Some(index) => Some(index),
        None if !comments.is_empty() => {
            header_cells.push(COMMENT_COLUMN);
            Some(header_cells.len() - 1)
        }
        None => None,
    };
    let width = header_cells.len();

    let mut lines = Vec::with_capacity(document.data_lines.len() + 1);
    lines.push(header_cells.join(","));

    for (index, line) in document.data_lines.iter().enumerate() {
        let mut cells = split_row(line);
        // Cells past the header stay after any appended columns
        let extra = if cells.len() > header_width {
            log::debug!(
                "Row {} has {} cells, header has {}",
                index + 1,
                cells.len(),
                header_width
            );
            cells.split_off(header_width)
        } else {
            Vec::new()
        };
        cells.resize(width, "");

        cells[label_column] = marks
            .get(&index)
            .map(|mark| mark.name.as_str())
            .unwrap_or(NO_LABEL_NAME);
        if let Some(column) = comment_column {
            cells[column] = comments.get(&index).map(String::as_str).unwrap_or("");
        }
        cells.extend(extra);

        lines.push(cells.join(","));
    }

    let mut out = lines.join(document.line_ending);
    if document.trailing_newline {
        out.push_str(document.line_ending);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NO_COLUMNS: [&str; 0] = [];

    fn mark(number: usize, name: &str, acronym: &str) -> Mark {
        Mark {
            number,
            name: name.to_string(),
            acronym: acronym.to_string(),
        }
    }

    #[test]
    fn test_parse_skips_blank_lines_and_trims_headers() {
        let text = "\n FileName , Age,label\n\na.png,3,\n   \nb.png,4,Cat\n";
        let (doc, cols) = parse(text, ["age"]).expect("parse");

        assert_eq!(doc.headers, vec!["FileName", "Age", "label"]);
        assert_eq!(doc.data_lines, vec!["a.png,3,", "b.png,4,Cat"]);
        assert_eq!(cols.filename, 0);
        assert_eq!(cols.label, Some(2));
        assert_eq!(cols.comment, None);
        assert_eq!(cols.metadata.get("age"), Some(&1));
        assert!(doc.trailing_newline);
        assert_eq!(doc.line_ending, "\n");
    }

    #[test]
    fn test_parse_missing_filename() {
        let err = parse("name,label\na.png,Cat", NO_COLUMNS).unwrap_err();
        assert_eq!(err, FormatError::missing_column("filename"));
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(parse("\n \r\n", NO_COLUMNS).unwrap_err(), FormatError::Empty);
    }

    #[test]
    fn test_parse_skips_unknown_and_reserved_metadata() {
        let columns = ["label", "Comment", "gender", "height"];
        let (_, cols) = parse("filename,label,comment,gender", columns).expect("parse");
        assert_eq!(cols.metadata.len(), 1);
        assert_eq!(cols.metadata.get("gender"), Some(&3));
    }

    #[test]
    fn test_cell_access_is_trimmed() {
        let (doc, _) = parse("filename,age\n a.png , 7 ", NO_COLUMNS).expect("parse");
        assert_eq!(doc.cell(0, 0), Some("a.png"));
        assert_eq!(doc.cell(0, 1), Some("7"));
        assert_eq!(doc.cell(0, 2), None);
        assert_eq!(doc.cell(1, 0), None);
    }

    #[test]
    fn test_serialize_appends_label_column() {
        let (doc, _) = parse("filename,age\na.png,3\nb.png,4", NO_COLUMNS).expect("parse");
        let mut marks = BTreeMap::new();
        marks.insert(1, mark(2, "Cat", "C"));

        let out = serialize(&doc, &marks, &BTreeMap::new());
        assert_eq!(out, "filename,age,label\na.png,3,No label\nb.png,4,Cat");
    }

    #[test]
    fn test_serialize_updates_existing_columns_in_place() {
        let text = "Label,filename,Comment,extra\nx,a.png,old, keep me \ny,b.png,,z\n";
        let (doc, _) = parse(text, NO_COLUMNS).expect("parse");
        let mut marks = BTreeMap::new();
        marks.insert(0, mark(1, "Dog", "D"));
        let mut comments = BTreeMap::new();
        comments.insert(1, "blurry".to_string());

        let out = serialize(&doc, &marks, &comments);
        assert_eq!(
            out,
            "Label,filename,Comment,extra\nDog,a.png,, keep me \nNo label,b.png,blurry,z\n"
        );
    }

    #[test]
    fn test_serialize_appends_comment_column_only_when_needed() {
        let (doc, _) = parse("filename\na.png\nb.png", NO_COLUMNS).expect("parse");
        let mut comments = BTreeMap::new();
        comments.insert(0, "check".to_string());

        let out = serialize(&doc, &BTreeMap::new(), &comments);
        assert_eq!(out, "filename,label,comment\na.png,No label,check\nb.png,No label,");
    }

    #[test]
    fn test_serialize_pads_short_rows() {
        let (doc, _) = parse("filename,age,label\na.png", NO_COLUMNS).expect("parse");
        let mut marks = BTreeMap::new();
        marks.insert(0, mark(1, "Dog", "D"));
        assert_eq!(
            serialize(&doc, &marks, &BTreeMap::new()),
            "filename,age,label\na.png,,Dog"
        );
    }

    #[test]
    fn test_serialize_keeps_cells_past_the_header() {
        let (doc, _) = parse("filename\na.png,stray\nb.png", NO_COLUMNS).expect("parse");
        let mut comments = BTreeMap::new();
        comments.insert(1, "dark".to_string());
        assert_eq!(
            serialize(&doc, &BTreeMap::new(), &comments),
            "filename,label,comment\na.png,No label,,stray\nb.png,No label,dark"
        );
    }

    #[test]
    fn test_serialize_keeps_crlf() {
        let (doc, _) = parse("filename,label\r\na.png,\r\n", NO_COLUMNS).expect("parse");
        assert_eq!(doc.line_ending, "\r\n");
        assert_eq!(
            serialize(&doc, &BTreeMap::new(), &BTreeMap::new()),
            "filename,label\r\na.png,No label\r\n"
        );
    }

    #[test]
    fn test_roundtrip_preserves_unrelated_columns() {
        let text = "id, filename ,notes,label\n7, a b.png ,  spaced  ,Cat\n8,c.png,,\n";
        let (doc, _) = parse(text, NO_COLUMNS).expect("parse");
        let out = serialize(&doc, &BTreeMap::new(), &BTreeMap::new());
        let (reparsed, _) = parse(&out, NO_COLUMNS).expect("reparse");

        for row in 0..doc.row_count() {
            for column in 0..3 {
                assert_eq!(
                    split_row(&reparsed.data_lines[row])[column],
                    split_row(&doc.data_lines[row])[column]
                );
            }
        }
        assert_eq!(reparsed.header_line, doc.header_line);
    }
}
