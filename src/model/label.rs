//! Label definitions and the per-item marks that reference them.

/// An enabled label a reviewer can assign.
///
/// Its 1-based position in the enabled label list is its label number;
/// number `0` is reserved for "no label" and never has a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDefinition {
    /// Short code typed to select the label
    pub acronym: String,
    /// Display name, also the value written to the CSV
    pub name: String,
    /// Whether the label is eligible for assignment
    pub enabled: bool,
    /// Hex color assigned from the palette
    pub color: String,
}

impl LabelDefinition {
    /// Create a new enabled label with the given acronym, name and color.
    pub fn new(acronym: &str, name: &str, color: &str) -> Self {
        Self {
            acronym: acronym.to_string(),
            name: name.to_string(),
            enabled: true,
            color: color.to_string(),
        }
    }
}

/// The label currently assigned to one item.
///
/// A stored mark always has `number >= 1`; "no label" is represented by the
/// absence of a mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    /// 1-based label number
    pub number: usize,
    /// Label display name at the time of assignment
    pub name: String,
    /// Label acronym at the time of assignment
    pub acronym: String,
}

impl Mark {
    /// Build a mark pointing at the given label definition.
    pub fn from_label(number: usize, label: &LabelDefinition) -> Self {
        Self {
            number,
            name: label.name.clone(),
            acronym: label.acronym.clone(),
        }
    }
}
