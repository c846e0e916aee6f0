//! Modal dialogs that capture the keyboard while open.

/// The open modal, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    /// Label list; `selected` is the highlighted label number (0 = no label)
    LabelPicker { item: usize, selected: usize },
    /// Free-text editor for the comment of `item`
    Comment { item: usize, draft: String },
    /// Settings form (edited outside the engine)
    Settings,
}

impl Dialog {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Dialog::LabelPicker { .. } => "label picker",
            Dialog::Comment { .. } => "comment",
            Dialog::Settings => "settings",
        }
    }
}
