//! Keymap: which message a key press stands for.
//!
//! Evaluated once per key press; the first rule that matches wins:
//!
//! 1. an open dialog gets the keys it understands and nothing else
//! 2. undo / redo
//! 3. copy file name
//! 4. arrow keys
//! 5. `0` clears the label
//! 6. the configured rotation key
//! 7. space toggles zoom
//! 8. the configured label list and comment keys
//! 9. `1`-`9` pick a label by number
//! 10. any other letter is typed towards an acronym

use crate::keybindings::{Key, KeyBindings, KeyEvent};
use crate::message::Message;
use crate::navigation::Direction;
use crate::state::Dialog;

/// Translate a key press into a message, if it means anything here.
pub fn message_for_key(
    event: &KeyEvent,
    dialog: Option<&Dialog>,
    bindings: &KeyBindings,
) -> Option<Message> {
    if let Some(dialog) = dialog {
        return dialog_message(event, dialog);
    }

    let key = event.key;
    let modifiers = event.modifiers;

    if modifiers.command() {
        match key.letter().map(|c| c.to_ascii_lowercase()) {
            Some('z') if modifiers.shift => return Some(Message::Redo),
            Some('z') => return Some(Message::Undo),
            Some('y') => return Some(Message::Redo),
            Some('c') => return Some(Message::CopyFileName),
            _ => {}
        }
    }

    let direction = match key {
        Key::Left => Some(Direction::Left),
        Key::Right => Some(Direction::Right),
        Key::Up => Some(Direction::Up),
        Key::Down => Some(Direction::Down),
        _ => None,
    };
    if let Some(direction) = direction {
        return Some(Message::Navigate {
            direction,
            by_page: modifiers.command(),
        });
    }

    if key.digit() == Some(0) {
        return Some(Message::ClearMark);
    }
    if key.matches(bindings.label_rotation) {
        return Some(Message::CycleMark);
    }
    if key == Key::Space {
        return Some(Message::ToggleZoom);
    }
    if key.matches(bindings.label_dropdown) {
        return Some(Message::OpenLabelPicker);
    }
    if key.matches(bindings.comment) {
        return Some(Message::OpenComment);
    }
    if let Some(digit) = key.digit() {
        return Some(Message::SetMark(digit as usize));
    }

    match key.letter() {
        Some(letter) if !modifiers.command() && !modifiers.alt => {
            Some(Message::TypeAcronym(letter.to_ascii_uppercase()))
        }
        _ => None,
    }
}

fn dialog_message(event: &KeyEvent, dialog: &Dialog) -> Option<Message> {
    match (dialog, event.key) {
        (_, Key::Escape) => Some(Message::CloseDialog),
        (Dialog::LabelPicker { .. }, Key::Up) => Some(Message::PickerPrevious),
        (Dialog::LabelPicker { .. }, Key::Down) => Some(Message::PickerNext),
        (Dialog::LabelPicker { .. }, Key::Enter) => Some(Message::PickerConfirm),
        (Dialog::Comment { .. }, Key::Enter) => Some(Message::CommentSubmit),
        (Dialog::Comment { .. }, Key::Backspace) => Some(Message::CommentBackspace),
        (Dialog::Comment { .. }, Key::Space) => Some(Message::CommentInput(' ')),
        (Dialog::Comment { .. }, Key::Char(c))
            if !event.modifiers.command() && !c.is_control() =>
        {
            Some(Message::CommentInput(c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::Modifiers;

    fn press(text: &str) -> Option<Message> {
        let event = KeyEvent::parse(text).expect("key");
        message_for_key(&event, None, &KeyBindings::default())
    }

    fn press_in(text: &str, dialog: &Dialog) -> Option<Message> {
        let event = KeyEvent::parse(text).expect("key");
        message_for_key(&event, Some(dialog), &KeyBindings::default())
    }

    #[test]
    fn test_undo_redo_combinations() {
        assert_eq!(press("Ctrl+z"), Some(Message::Undo));
        assert_eq!(press("Cmd+Z"), Some(Message::Undo));
        assert_eq!(press("Ctrl+Shift+Z"), Some(Message::Redo));
        assert_eq!(press("Ctrl+y"), Some(Message::Redo));
        assert_eq!(press("Ctrl+c"), Some(Message::CopyFileName));
    }

    #[test]
    fn test_arrows_and_page_modifier() {
        assert_eq!(
            press("ArrowRight"),
            Some(Message::Navigate {
                direction: Direction::Right,
                by_page: false
            })
        );
        assert_eq!(
            press("Ctrl+ArrowLeft"),
            Some(Message::Navigate {
                direction: Direction::Left,
                by_page: true
            })
        );
    }

    #[test]
    fn test_mark_keys() {
        assert_eq!(press("0"), Some(Message::ClearMark));
        assert_eq!(press("Enter"), Some(Message::CycleMark));
        assert_eq!(press("3"), Some(Message::SetMark(3)));
        assert_eq!(press("Space"), Some(Message::ToggleZoom));
        assert_eq!(press("Tab"), Some(Message::OpenLabelPicker));
        assert_eq!(press("F2"), Some(Message::OpenComment));
    }

    #[test]
    fn test_letters_type_acronyms() {
        assert_eq!(press("c"), Some(Message::TypeAcronym('C')));
        assert_eq!(press("Shift+d"), Some(Message::TypeAcronym('D')));
        assert_eq!(press("Alt+d"), None);
        assert_eq!(press("Ctrl+q"), None);
        assert_eq!(press("-"), None);
    }

    #[test]
    fn test_rotation_key_beats_typing() {
        let bindings = KeyBindings {
            label_rotation: Key::Char('r'),
            ..KeyBindings::default()
        };
        let event = KeyEvent::with_modifiers(Key::Char('R'), Modifiers::NONE);
        assert_eq!(
            message_for_key(&event, None, &bindings),
            Some(Message::CycleMark)
        );
    }

    #[test]
    fn test_dialogs_swallow_other_keys() {
        let picker = Dialog::LabelPicker {
            item: 0,
            selected: 0,
        };
        assert_eq!(press_in("ArrowDown", &picker), Some(Message::PickerNext));
        assert_eq!(press_in("Enter", &picker), Some(Message::PickerConfirm));
        assert_eq!(press_in("Escape", &picker), Some(Message::CloseDialog));
        assert_eq!(press_in("ArrowLeft", &picker), None);
        assert_eq!(press_in("Ctrl+z", &picker), None);

        assert_eq!(press_in("Escape", &Dialog::Settings), Some(Message::CloseDialog));
        assert_eq!(press_in("Enter", &Dialog::Settings), None);
        assert_eq!(press_in("c", &Dialog::Settings), None);
    }

    #[test]
    fn test_comment_dialog_editing() {
        let comment = Dialog::Comment {
            item: 2,
            draft: String::new(),
        };
        assert_eq!(press_in("b", &comment), Some(Message::CommentInput('b')));
        assert_eq!(press_in("0", &comment), Some(Message::CommentInput('0')));
        assert_eq!(press_in("Space", &comment), Some(Message::CommentInput(' ')));
        assert_eq!(press_in("Backspace", &comment), Some(Message::CommentBackspace));
        assert_eq!(press_in("Enter", &comment), Some(Message::CommentSubmit));
        assert_eq!(press_in("Ctrl+z", &comment), None);
    }
}
