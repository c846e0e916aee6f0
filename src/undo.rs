//! Undo/Redo history for annotation state.
//!
//! Every mutating operation records a full snapshot of the marks and comments
//! before it is applied. Snapshots are small (one entry per annotated item)
//! and make undo independent of which operation produced the change.

use std::collections::BTreeMap;

use crate::constants::UNDO_HISTORY_SIZE;
use crate::model::Mark;

// ============================================================================
// Snapshots
// ============================================================================

/// Full copy of the annotation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySnapshot {
    /// Marks keyed by item index
    pub marks: BTreeMap<usize, Mark>,
    /// Comments keyed by item index
    pub comments: BTreeMap<usize, String>,
    /// Human-readable description of the action this snapshot undoes
    pub description: String,
}

impl HistorySnapshot {
    /// Capture the given state.
    pub fn new(
        marks: &BTreeMap<usize, Mark>,
        comments: &BTreeMap<usize, String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            marks: marks.clone(),
            comments: comments.clone(),
            description: description.into(),
        }
    }
}

// ============================================================================
// Undo Stack
// ============================================================================

/// Configuration for the undo stack
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of snapshots to keep in history
    pub max_history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_history: UNDO_HISTORY_SIZE,
        }
    }
}

/// The undo/redo history stack.
///
/// Maintains two stacks:
/// - `undo_stack`: States to return to on undo (most recent at the end)
/// - `redo_stack`: States to return to on redo (most recent at the end)
///
/// Recording a new action clears the redo stack. Undo and redo move the
/// current state onto the opposite stack and hand back the state to restore.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    /// States that can be restored by undo
    undo_stack: Vec<HistorySnapshot>,
    /// States that can be restored by redo
    redo_stack: Vec<HistorySnapshot>,
    /// Configuration
    config: UndoConfig,
}

impl UndoStack {
    /// Create a new empty undo stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record the state before a new action.
    /// This clears the redo stack (can't redo after a new action).
    pub fn push(&mut self, snapshot: HistorySnapshot) {
        log::debug!("📝 Undo: pushed '{}'", snapshot.description);
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        // Limit history size, oldest first
        if self.undo_stack.len() > self.config.max_history {
            let excess = self.undo_stack.len() - self.config.max_history;
            self.undo_stack.drain(..excess);
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Step back one action.
    ///
    /// `current` is the state as it is now; it moves to the redo stack.
    /// Returns the state to restore, or None if there is nothing to undo
    /// (in which case `current` is discarded and nothing changes).
    pub fn pop_undo(&mut self, mut current: HistorySnapshot) -> Option<HistorySnapshot> {
        let snapshot = self.undo_stack.pop()?;
        log::debug!("⏪ Undo: '{}'", snapshot.description);
        current.description = snapshot.description.clone();
        self.redo_stack.push(current);
        Some(snapshot)
    }

    /// Step forward one undone action.
    ///
    /// `current` moves to the undo stack. Returns the state to restore, or
    /// None if there is nothing to redo.
    pub fn pop_redo(&mut self, mut current: HistorySnapshot) -> Option<HistorySnapshot> {
        let snapshot = self.redo_stack.pop()?;
        log::debug!("⏩ Redo: '{}'", snapshot.description);
        current.description = snapshot.description.clone();
        self.undo_stack.push(current);
        if self.undo_stack.len() > self.config.max_history {
            self.undo_stack.remove(0);
        }
        Some(snapshot)
    }

    /// Get the description of the action that would be undone
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|s| s.description.as_str())
    }

    /// Get the description of the action that would be redone
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|s| s.description.as_str())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }

    /// Get the number of snapshots in undo history
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of snapshots in redo history
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
