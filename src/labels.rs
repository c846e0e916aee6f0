//! Label registry: the enabled label set and label lookups.
//!
//! Label numbers are dense: the n-th enabled label has number `n` (1-based).
//! Number `0` always means "no label".

use crate::color_utils::palette_color;
use crate::config::LabelConfig;
use crate::constants::NO_LABEL_NAME;
use crate::model::{LabelDefinition, Mark};

/// Filter the label catalog down to the enabled labels, preserving order.
///
/// Colors follow the catalog slot, so a label keeps its color when another
/// label is toggled.
pub fn enabled_labels(catalog: &[LabelConfig]) -> Vec<LabelDefinition> {
    catalog
        .iter()
        .enumerate()
        .filter(|(_, label)| label.enabled)
        .map(|(slot, label)| {
            LabelDefinition::new(label.acronym.trim(), label.name.trim(), palette_color(slot))
        })
        .collect()
}

/// The ordered set of labels available for assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelRegistry {
    labels: Vec<LabelDefinition>,
}

impl LabelRegistry {
    /// Create a registry from already-enabled labels.
    pub fn new(labels: Vec<LabelDefinition>) -> Self {
        Self { labels }
    }

    /// Create a registry from the configured label catalog.
    pub fn from_config(catalog: &[LabelConfig]) -> Self {
        let registry = Self::new(enabled_labels(catalog));
        log::debug!(
            "Label registry: {} of {} labels enabled",
            registry.labels.len(),
            catalog.len()
        );
        registry
    }

    /// Enabled labels in number order (index 0 is label 1).
    pub fn labels(&self) -> &[LabelDefinition] {
        &self.labels
    }

    /// Highest valid label number.
    pub fn max_label_value(&self) -> usize {
        self.labels.len()
    }

    /// Definition for a label number (`None` for 0 or out of range).
    pub fn get(&self, number: usize) -> Option<&LabelDefinition> {
        number.checked_sub(1).and_then(|i| self.labels.get(i))
    }

    /// Display name for a label number: "No label" for 0, empty if out of range.
    pub fn name_for(&self, number: usize) -> &str {
        if number == 0 {
            return NO_LABEL_NAME;
        }
        self.get(number).map(|l| l.name.as_str()).unwrap_or("")
    }

    /// Color of a label number, if it names an enabled label.
    pub fn color_for(&self, number: usize) -> Option<&str> {
        self.get(number).map(|l| l.color.as_str())
    }

    /// Mark for a label number; `None` for 0 or out of range.
    pub fn mark_for(&self, number: usize) -> Option<Mark> {
        self.get(number).map(|label| Mark::from_label(number, label))
    }

    /// Label number for an exact display name, 0 if no enabled label has it.
    pub fn number_for_name(&self, name: &str) -> usize {
        self.labels
            .iter()
            .position(|l| l.name == name)
            .map_or(0, |i| i + 1)
    }

    /// Resolve a raw CSV cell to a label number.
    ///
    /// Tries the display name (exact), then the acronym (case-insensitive),
    /// then a number within `1..=max_label_value`. Anything else is 0.
    pub fn resolve(&self, raw: &str) -> usize {
        let value = raw.trim();
        if value.is_empty() {
            return 0;
        }

        if let Some(i) = self.labels.iter().position(|l| l.name == value) {
            return i + 1;
        }

        let upper = value.to_uppercase();
        if let Some(i) = self
            .labels
            .iter()
            .position(|l| l.acronym.to_uppercase() == upper)
        {
            return i + 1;
        }

        match value.parse::<usize>() {
            Ok(number) if (1..=self.max_label_value()).contains(&number) => number,
            _ => 0,
        }
    }

    /// Find the label a typed acronym refers to.
    ///
    /// Exact (case-insensitive) acronym matches win; otherwise the first
    /// label whose acronym starts with the typed text. Returns 0 on no match.
    pub fn find_by_acronym_prefix(&self, typed: &str) -> usize {
        let typed = typed.trim().to_uppercase();
        if typed.is_empty() {
            return 0;
        }

        let acronyms: Vec<String> = self.labels.iter().map(|l| l.acronym.to_uppercase()).collect();

        if let Some(i) = acronyms.iter().position(|a| *a == typed) {
            return i + 1;
        }
        acronyms
            .iter()
            .position(|a| a.starts_with(&typed))
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}
