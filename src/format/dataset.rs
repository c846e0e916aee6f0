//! Building the in-memory dataset from a metadata CSV.

use std::collections::BTreeMap;

use super::csv::{ColumnIndex, CsvDocument, parse, serialize, split_row};
use super::error::FormatError;
use crate::config::AppConfig;
use crate::constants::NO_LABEL_NAME;
use crate::labels::LabelRegistry;
use crate::model::{Item, Mark};

/// Items plus the marks and comments read from one metadata CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// The raw document, kept for writing back
    pub document: CsvDocument,
    /// Resolved column positions
    pub columns: ColumnIndex,
    /// One item per data row
    pub items: Vec<Item>,
    /// Initial marks resolved from the `label` column
    pub marks: BTreeMap<usize, Mark>,
    /// Initial comments from the `comment` column
    pub comments: BTreeMap<usize, String>,
}

impl Dataset {
    /// Parse a metadata CSV into items and their initial annotations.
    ///
    /// Label cells are resolved through the registry; values that name no
    /// enabled label leave the item unmarked.
    pub fn parse(
        text: &str,
        config: &AppConfig,
        registry: &LabelRegistry,
    ) -> Result<Self, FormatError> {
        let (document, columns) = parse(text, config.metadata.enabled_columns())?;
        let image_path = config.paths.image_path.as_str();

        let mut items = Vec::with_capacity(document.row_count());
        let mut marks = BTreeMap::new();
        let mut comments = BTreeMap::new();

        for (index, line) in document.data_lines.iter().enumerate() {
            let cells = split_row(line);
            let cell = |column: usize| cells.get(column).map(|c| c.trim()).unwrap_or("");

            let mut item = Item::new(index, cell(columns.filename), image_path);
            for (name, &column) in &columns.metadata {
                item.metadata.insert(name.clone(), cell(column).to_string());
            }

            if let Some(column) = columns.label {
                let raw = cell(column);
                match registry.mark_for(registry.resolve(raw)) {
                    Some(mark) => {
                        marks.insert(index, mark);
                    }
                    None if !raw.is_empty() && raw != NO_LABEL_NAME => {
                        log::debug!("Row {}: label '{}' matches no enabled label", index, raw);
                    }
                    None => {}
                }
            }

            if let Some(column) = columns.comment {
                let comment = cell(column);
                if !comment.is_empty() {
                    comments.insert(index, comment.to_string());
                }
            }

            items.push(item);
        }

        log::info!(
            "Loaded {} items ({} labeled, {} commented)",
            items.len(),
            marks.len(),
            comments.len()
        );

        Ok(Self {
            document,
            columns,
            items,
            marks,
            comments,
        })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the dataset has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize the document with the given annotations.
    pub fn to_csv(&self, marks: &BTreeMap<usize, Mark>, comments: &BTreeMap<usize, String>) -> String {
        serialize(&self.document, marks, comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LabelConfig, MetadataColumn};
    use pretty_assertions::assert_eq;

    fn pets_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.hotkeys.labels = vec![
            LabelConfig::new("D", "Dog", true),
            LabelConfig::new("C", "Cat", true),
        ];
        config
    }

    #[test]
    fn test_label_column_resolves_marks() {
        let config = pets_config();
        let registry = LabelRegistry::from_config(&config.hotkeys.labels);
        let dataset =
            Dataset::parse("filename,label\na.png,\nb.png,Cat", &config, &registry).expect("parse");

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.marks.len(), 1);
        assert_eq!(
            dataset.marks.get(&1),
            Some(&Mark {
                number: 2,
                name: "Cat".to_string(),
                acronym: "C".to_string(),
            })
        );
        assert_eq!(
            dataset.to_csv(&dataset.marks, &dataset.comments),
            "filename,label\na.png,No label\nb.png,Cat"
        );
    }

    #[test]
    fn test_numbers_and_acronyms_resolve() {
        let config = pets_config();
        let registry = LabelRegistry::from_config(&config.hotkeys.labels);
        let text = "filename,label\na.png,1\nb.png,c\nc.png,9\nd.png,No label\ne.png,Horse";
        let dataset = Dataset::parse(text, &config, &registry).expect("parse");

        assert_eq!(dataset.marks.get(&0).map(|m| m.number), Some(1));
        assert_eq!(dataset.marks.get(&1).map(|m| m.number), Some(2));
        assert!(!dataset.marks.contains_key(&2));
        assert!(!dataset.marks.contains_key(&3));
        assert!(!dataset.marks.contains_key(&4));
    }

    #[test]
    fn test_items_carry_paths_metadata_and_comments() {
        let mut config = pets_config();
        config.paths.image_path = "/img/".to_string();
        config.metadata.columns = vec![
            MetadataColumn {
                name: "age".to_string(),
                enabled: true,
            },
            MetadataColumn {
                name: "owner".to_string(),
                enabled: false,
            },
            MetadataColumn {
                name: "missing".to_string(),
                enabled: true,
            },
        ];
        let registry = LabelRegistry::from_config(&config.hotkeys.labels);
        let text = "FILENAME,Age,Owner,Comment\nmy dog.png, 4 ,ann, good boy \nb.png,2,bob,  \n";
        let dataset = Dataset::parse(text, &config, &registry).expect("parse");

        let first = &dataset.items[0];
        assert_eq!(first.file_name, "my dog.png");
        assert_eq!(first.full_path, "/img/my%20dog.png");
        assert_eq!(first.metadata_value("age"), Some("4"));
        assert_eq!(first.metadata_value("owner"), None);
        assert_eq!(first.metadata_value("missing"), None);
        assert_eq!(dataset.comments.get(&0).map(String::as_str), Some("good boy"));
        assert!(!dataset.comments.contains_key(&1));
        assert!(dataset.marks.is_empty());
    }

    #[test]
    fn test_missing_filename_column_fails() {
        let config = pets_config();
        let registry = LabelRegistry::from_config(&config.hotkeys.labels);
        let err = Dataset::parse("image,label\na.png,Dog", &config, &registry).unwrap_err();
        assert_eq!(err, FormatError::missing_column("filename"));
    }
}
