//! Annotation store: the current mark and comment of every item.
//!
//! All mutations go through the store so that each one records an undo
//! snapshot first. Each mutating method returns `true` when the state
//! changed; callers use that to decide whether to persist.

use std::collections::BTreeMap;

use crate::constants::NO_LABEL_NAME;
use crate::labels::LabelRegistry;
use crate::model::Mark;
use crate::undo::{HistorySnapshot, UndoStack};

/// Marks and comments for one loaded dataset, with their history.
///
/// Invariants: every key is a valid item index (`< item_count`), a stored
/// mark never has number 0, and a stored comment is never blank.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    item_count: usize,
    marks: BTreeMap<usize, Mark>,
    comments: BTreeMap<usize, String>,
    history: UndoStack,
}

impl AnnotationStore {
    /// Create a store for `item_count` items with initial annotations.
    ///
    /// Entries for out-of-range indices, zero marks and blank comments are
    /// dropped.
    pub fn new(
        item_count: usize,
        mut marks: BTreeMap<usize, Mark>,
        mut comments: BTreeMap<usize, String>,
    ) -> Self {
        marks.retain(|&index, mark| index < item_count && mark.number > 0);
        comments.retain(|&index, comment| {
            let keep = index < item_count && !comment.trim().is_empty();
            if keep {
                *comment = comment.trim().to_string();
            }
            keep
        });

        Self {
            item_count,
            marks,
            comments,
            history: UndoStack::new(),
        }
    }

    /// Number of items this store annotates.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// All marks keyed by item index.
    pub fn marks(&self) -> &BTreeMap<usize, Mark> {
        &self.marks
    }

    /// All comments keyed by item index.
    pub fn comments(&self) -> &BTreeMap<usize, String> {
        &self.comments
    }

    /// Mark of an item, if it has one.
    pub fn mark(&self, index: usize) -> Option<&Mark> {
        self.marks.get(&index)
    }

    /// Label number of an item (0 when unmarked).
    pub fn mark_number(&self, index: usize) -> usize {
        self.marks.get(&index).map(|m| m.number).unwrap_or(0)
    }

    /// Display name of an item's label ("No label" when unmarked).
    pub fn mark_name(&self, index: usize) -> &str {
        self.marks
            .get(&index)
            .map(|m| m.name.as_str())
            .unwrap_or(NO_LABEL_NAME)
    }

    /// Comment of an item, if it has one.
    pub fn comment(&self, index: usize) -> Option<&str> {
        self.comments.get(&index).map(String::as_str)
    }

    /// Undo/redo history.
    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Advance an item to the next label, wrapping back to "no label" after
    /// the last enabled label.
    pub fn cycle_mark(&mut self, index: usize, registry: &LabelRegistry) -> bool {
        if index >= self.item_count {
            return false;
        }
        let next = (self.mark_number(index) + 1) % (registry.max_label_value() + 1);
        if next == self.mark_number(index) {
            // no labels enabled
            return false;
        }
        self.record("Cycle label");
        self.apply_mark(index, next, registry);
        log::debug!("🔁 Item {} cycled to label {}", index, next);
        true
    }

    /// Assign a label number to an item (0 clears it).
    ///
    /// Rejected without touching history when the number is outside
    /// `0..=max_label_value`, the index is unknown, or the item already
    /// has that label.
    pub fn set_mark(&mut self, index: usize, number: i64, registry: &LabelRegistry) -> bool {
        if index >= self.item_count {
            return false;
        }
        let Ok(number) = usize::try_from(number) else {
            log::debug!("Rejected label {} for item {}", number, index);
            return false;
        };
        if number > registry.max_label_value() {
            log::debug!("Rejected label {} for item {}", number, index);
            return false;
        }
        if self.mark_number(index) == number {
            return false;
        }

        let description = match number {
            0 => "Clear label".to_string(),
            n => format!("Set label '{}'", registry.name_for(n)),
        };
        self.record(description);
        self.apply_mark(index, number, registry);
        log::debug!("🏷️ Item {} set to label {}", index, number);
        true
    }

    /// Remove the label of an item.
    pub fn clear_mark(&mut self, index: usize, registry: &LabelRegistry) -> bool {
        self.set_mark(index, 0, registry)
    }

    /// Set the comment of an item. Blank text removes the comment.
    pub fn set_comment(&mut self, index: usize, text: &str) -> bool {
        if index >= self.item_count {
            return false;
        }
        let text = text.trim();
        if self.comment(index).unwrap_or("") == text {
            return false;
        }

        self.record(if text.is_empty() {
            "Remove comment"
        } else {
            "Edit comment"
        });
        if text.is_empty() {
            self.comments.remove(&index);
        } else {
            self.comments.insert(index, text.to_string());
        }
        log::debug!("💬 Item {} comment updated", index);
        true
    }

    /// Restore the state before the most recent action.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot("");
        match self.history.pop_undo(current) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone action.
    pub fn redo(&mut self) -> bool {
        let current = self.snapshot("");
        match self.history.pop_redo(current) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Re-resolve every mark against a changed label set.
    ///
    /// Marks are matched by name; marks whose label is no longer enabled are
    /// dropped. History refers to the old numbering and is cleared.
    pub fn relabel(&mut self, registry: &LabelRegistry) -> bool {
        let before = self.marks.clone();
        self.marks = before
            .iter()
            .filter_map(|(&index, mark)| {
                registry
                    .mark_for(registry.number_for_name(&mark.name))
                    .map(|m| (index, m))
            })
            .collect();
        self.history.clear();

        let changed = self.marks != before;
        if changed {
            log::info!(
                "Label set changed: {} of {} marks kept",
                self.marks.len(),
                before.len()
            );
        }
        changed
    }

    /// Number of items per label number; index 0 counts unmarked items.
    pub fn label_counts(&self, registry: &LabelRegistry) -> Vec<usize> {
        let mut counts = vec![0; registry.max_label_value() + 1];
        for mark in self.marks.values() {
            if let Some(count) = counts.get_mut(mark.number) {
                *count += 1;
            }
        }
        counts[0] = self.item_count.saturating_sub(self.marks.len());
        counts
    }

    fn snapshot(&self, description: &str) -> HistorySnapshot {
        HistorySnapshot::new(&self.marks, &self.comments, description)
    }

    fn record(&mut self, description: impl Into<String>) {
        let snapshot = self.snapshot("");
        self.history.push(HistorySnapshot {
            description: description.into(),
            ..snapshot
        });
    }

    fn restore(&mut self, snapshot: HistorySnapshot) {
        self.marks = snapshot.marks;
        self.comments = snapshot.comments;
    }

    fn apply_mark(&mut self, index: usize, number: usize, registry: &LabelRegistry) {
        match registry.mark_for(number) {
            Some(mark) => {
                self.marks.insert(index, mark);
            }
            None => {
                self.marks.remove(&index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelConfig;
    use crate::constants::UNDO_HISTORY_SIZE;

    fn registry(count: usize) -> LabelRegistry {
        let catalog: Vec<LabelConfig> = (0..count)
            .map(|i| LabelConfig::new(&format!("L{}", i + 1), &format!("Label {}", i + 1), true))
            .collect();
        LabelRegistry::from_config(&catalog)
    }

    fn pets() -> LabelRegistry {
        LabelRegistry::from_config(&[
            LabelConfig::new("D", "Dog", true),
            LabelConfig::new("C", "Cat", true),
        ])
    }

    fn store(items: usize) -> AnnotationStore {
        AnnotationStore::new(items, BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn test_cycle_walks_all_labels_and_back() {
        for labels in 0..6 {
            let reg = registry(labels);
            let mut s = store(1);
            for step in 1..=labels {
                assert!(s.cycle_mark(0, &reg));
                assert_eq!(s.mark_number(0), step);
            }
            assert_eq!(s.cycle_mark(0, &reg), labels > 0);
            assert!(s.mark(0).is_none(), "labels={}", labels);
        }
    }

    #[test]
    fn test_cycle_from_any_start_returns_after_full_round() {
        let reg = registry(4);
        for start in 0..=4 {
            let mut s = store(1);
            s.set_mark(0, start as i64, &reg);
            for _ in 0..=4 {
                s.cycle_mark(0, &reg);
            }
            assert_eq!(s.mark_number(0), start);
        }
    }

    #[test]
    fn test_cycle_once_sets_first_label() {
        let reg = pets();
        let mut s = store(2);
        s.cycle_mark(0, &reg);
        assert_eq!(
            s.mark(0),
            Some(&Mark {
                number: 1,
                name: "Dog".to_string(),
                acronym: "D".to_string(),
            })
        );
    }

    #[test]
    fn test_set_mark_out_of_range_is_noop() {
        let reg = pets();
        let mut s = store(2);
        s.set_mark(1, 2, &reg);
        let before = s.marks().clone();
        let undo_before = s.history().undo_count();

        assert!(!s.set_mark(0, -1, &reg));
        assert!(!s.set_mark(0, 3, &reg));
        assert!(!s.set_mark(5, 1, &reg));

        assert_eq!(s.marks(), &before);
        assert_eq!(s.history().undo_count(), undo_before);
    }

    #[test]
    fn test_set_mark_zero_removes_entry() {
        let reg = pets();
        let mut s = store(1);
        assert!(s.set_mark(0, 2, &reg));
        assert_eq!(s.mark_name(0), "Cat");
        assert!(s.clear_mark(0, &reg));
        assert!(s.mark(0).is_none());
        assert_eq!(s.mark_name(0), NO_LABEL_NAME);
        assert!(!s.marks().values().any(|m| m.number == 0));
    }

    #[test]
    fn test_set_same_mark_is_not_recorded() {
        let reg = pets();
        let mut s = store(1);
        assert!(s.set_mark(0, 1, &reg));
        assert!(!s.set_mark(0, 1, &reg));
        assert_eq!(s.history().undo_count(), 1);
    }

    #[test]
    fn test_comment_trim_and_remove() {
        let mut s = store(2);
        assert!(s.set_comment(1, "  motion blur "));
        assert_eq!(s.comment(1), Some("motion blur"));
        assert!(!s.set_comment(1, "motion blur"));
        assert!(s.set_comment(1, "   "));
        assert_eq!(s.comment(1), None);
        assert!(!s.set_comment(7, "nope"));
    }

    #[test]
    fn test_undo_all_restores_initial_state() {
        let reg = pets();
        let mut initial = BTreeMap::new();
        initial.insert(3, reg.mark_for(2).expect("cat"));
        let mut s = AnnotationStore::new(5, initial, BTreeMap::new());
        let start_marks = s.marks().clone();

        let mut k = 0;
        for i in 0..5 {
            k += usize::from(s.cycle_mark(i, &reg));
            k += usize::from(s.set_comment(i, &format!("note {}", i)));
        }
        k += usize::from(s.set_mark(3, 0, &reg));

        for _ in 0..k {
            assert!(s.undo());
        }
        assert!(!s.undo());
        assert_eq!(s.marks(), &start_marks);
        assert!(s.comments().is_empty());
    }

    #[test]
    fn test_redo_reapplies_and_new_action_clears_redo() {
        let reg = pets();
        let mut s = store(2);
        s.cycle_mark(0, &reg);
        s.cycle_mark(0, &reg);
        assert!(s.undo());
        assert_eq!(s.mark_number(0), 1);
        assert!(s.redo());
        assert_eq!(s.mark_number(0), 2);

        s.undo();
        s.undo();
        assert_eq!(s.history().redo_count(), 2);
        s.set_comment(1, "new");
        assert_eq!(s.history().redo_count(), 0);
        assert!(!s.redo());
    }

    #[test]
    fn test_history_bounded() {
        let reg = pets();
        let mut s = store(1);
        for _ in 0..(UNDO_HISTORY_SIZE * 3) {
            s.cycle_mark(0, &reg);
        }
        assert_eq!(s.history().undo_count(), UNDO_HISTORY_SIZE);
    }

    #[test]
    fn test_new_drops_invalid_entries() {
        let reg = pets();
        let mut marks = BTreeMap::new();
        marks.insert(0, reg.mark_for(1).expect("dog"));
        marks.insert(9, reg.mark_for(1).expect("dog"));
        marks.insert(
            1,
            Mark {
                number: 0,
                name: NO_LABEL_NAME.to_string(),
                acronym: String::new(),
            },
        );
        let mut comments = BTreeMap::new();
        comments.insert(0, " ok ".to_string());
        comments.insert(1, "  ".to_string());

        let s = AnnotationStore::new(2, marks, comments);
        assert_eq!(s.marks().keys().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(s.comment(0), Some("ok"));
        assert_eq!(s.comments().len(), 1);
    }

    #[test]
    fn test_relabel_by_name() {
        let old = pets();
        let mut s = store(3);
        s.set_mark(0, 1, &old);
        s.set_mark(1, 2, &old);

        let new = LabelRegistry::from_config(&[
            LabelConfig::new("D", "Dog", false),
            LabelConfig::new("C", "Cat", true),
        ]);
        assert!(s.relabel(&new));
        assert!(s.mark(0).is_none());
        assert_eq!(s.mark_number(1), 1);
        assert!(!s.history().can_undo());
    }

    #[test]
    fn test_relabel_ignores_acronyms_and_numbers() {
        let old = LabelRegistry::from_config(&[
            LabelConfig::new("X", "C", true),
            LabelConfig::new("T", "2", true),
            LabelConfig::new("C", "Cat", true),
        ]);
        let mut s = store(3);
        s.set_mark(0, 1, &old);
        s.set_mark(1, 2, &old);
        s.set_mark(2, 3, &old);

        let new = LabelRegistry::from_config(&[
            LabelConfig::new("X", "C", false),
            LabelConfig::new("T", "2", false),
            LabelConfig::new("C", "Cat", true),
            LabelConfig::new("B", "Bird", true),
        ]);
        assert!(s.relabel(&new));
        assert!(s.mark(0).is_none());
        assert!(s.mark(1).is_none());
        assert_eq!(s.mark_name(2), "Cat");
        assert_eq!(s.mark_number(2), 1);
    }

    #[test]
    fn test_label_counts() {
        let reg = pets();
        let mut s = store(4);
        s.set_mark(0, 1, &reg);
        s.set_mark(1, 2, &reg);
        s.set_mark(2, 2, &reg);
        assert_eq!(s.label_counts(&reg), vec![1, 1, 2]);
    }
}
