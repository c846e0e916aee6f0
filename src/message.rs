//! Operations a session can perform.
//!
//! Key events are translated to messages by [`crate::input`]; drivers can
//! also send the non-keyboard ones directly.

use crate::navigation::{Direction, Filter, GridGeometry};

/// Messages that update session state.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // History
    /// Undo last action
    Undo,
    /// Redo previously undone action
    Redo,

    // Grid
    /// Move the selection; `by_page` jumps whole pages
    Navigate { direction: Direction, by_page: bool },
    /// Show only items matching the filter
    SetFilter(Filter),
    /// Use an explicit grid size
    SetGeometry(GridGeometry),
    /// Fit the grid into a viewport of the given size in pixels
    Resize { width: f32, height: f32 },
    /// Zoom in on the current item, or back out
    ToggleZoom,
    /// Copy the current item's file name
    CopyFileName,

    // Marks
    /// Advance the current item to the next label
    CycleMark,
    /// Remove the current item's label
    ClearMark,
    /// Give the current item a label number
    SetMark(usize),
    /// A letter typed towards a label acronym
    TypeAcronym(char),

    // Dialogs
    /// Open the label list for the current item
    OpenLabelPicker,
    /// Open the comment editor for the current item
    OpenComment,
    /// Open the settings modal
    OpenSettings,
    /// Close the open dialog without applying it
    CloseDialog,
    /// Highlight the previous label in the picker
    PickerPrevious,
    /// Highlight the next label in the picker
    PickerNext,
    /// Apply the highlighted label
    PickerConfirm,
    /// Character typed into the comment editor
    CommentInput(char),
    /// Delete the last character of the comment draft
    CommentBackspace,
    /// Store the comment draft
    CommentSubmit,
}

impl Message {
    /// Whether this message keeps the typed-acronym buffer alive.
    pub fn continues_typing(&self) -> bool {
        matches!(self, Message::TypeAcronym(_))
    }
}

/// Side effects the host has to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Put the text on the system clipboard
    CopyToClipboard(String),
}
