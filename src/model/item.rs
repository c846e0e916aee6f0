//! Items loaded from the metadata CSV.

use indexmap::IndexMap;

/// One image row of the loaded CSV.
///
/// Immutable once loaded; `index` is the join key for marks and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// 0-based position among the CSV data rows
    pub index: usize,
    /// File name as written in the `filename` column
    pub file_name: String,
    /// Image location: the image path followed by the URL-encoded file name
    pub full_path: String,
    /// Values of the enabled metadata columns, in configuration order
    pub metadata: IndexMap<String, String>,
}

impl Item {
    /// Create an item, deriving its full path from the image path prefix.
    pub fn new(index: usize, file_name: &str, image_path: &str) -> Self {
        Self {
            index,
            file_name: file_name.to_string(),
            full_path: format!("{}{}", image_path, urlencoding::encode(file_name)),
            metadata: IndexMap::new(),
        }
    }

    /// Value of a metadata column, if it was loaded.
    pub fn metadata_value(&self, column: &str) -> Option<&str> {
        self.metadata.get(column).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_is_encoded() {
        let item = Item::new(3, "scan 01#a.png", "/images/");
        assert_eq!(item.full_path, "/images/scan%2001%23a.png");
        assert_eq!(item.index, 3);
    }

    #[test]
    fn test_metadata_lookup() {
        let mut item = Item::new(0, "a.png", "/images/");
        item.metadata.insert("age".to_string(), "42".to_string());
        assert_eq!(item.metadata_value("age"), Some("42"));
        assert_eq!(item.metadata_value("gender"), None);
    }
}
