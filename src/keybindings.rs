//! Key events and configurable keybindings.
//!
//! Keys are named the way the settings file names them (`"Enter"`, `"Tab"`,
//! `"ArrowLeft"`, `"F2"`, a single character). Key events can also be written
//! with modifier prefixes, e.g. `"Ctrl+Shift+Z"`.

use crate::config::HotkeysConfig;

/// Keyboard keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function key F1-F12
    F(u8),
}

impl Key {
    /// The letter carried by this key, if it is an alphabetic character.
    pub fn letter(&self) -> Option<char> {
        match self {
            Key::Char(c) if c.is_alphabetic() => Some(*c),
            _ => None,
        }
    }

    /// The digit carried by this key, if it is `0`-`9`.
    pub fn digit(&self) -> Option<u32> {
        match self {
            Key::Char(c) => c.to_digit(10),
            _ => None,
        }
    }

    /// Whether two keys name the same binding. Letters compare case-insensitively.
    pub fn matches(&self, other: Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.to_lowercase().eq(b.to_lowercase()),
            (a, b) => *a == b,
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press with the modifiers held at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// A key press with the given modifiers.
    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parse a key event description like `"Ctrl+Z"`, `"Shift+Cmd+z"` or `"a"`.
    ///
    /// A lone `"+"` is the plus character, not an empty modifier list.
    pub fn parse(text: &str) -> Option<Self> {
        if text == "+" {
            return Some(Self::new(Key::Char('+')));
        }

        let mut parts: Vec<&str> = text.split('+').collect();
        let key_name = parts.pop()?;
        let key = parse_key(key_name)?;

        let mut modifiers = Modifiers::NONE;
        for part in parts {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                "meta" | "cmd" | "super" => modifiers.meta = true,
                _ => return None,
            }
        }

        Some(Self { key, modifiers })
    }
}

/// Parse a key name as used in the settings file.
pub fn parse_key(name: &str) -> Option<Key> {
    if name == " " {
        return Some(Key::Space);
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key::Char(c));
    }

    let key = match name.to_ascii_lowercase().as_str() {
        "enter" | "return" => Key::Enter,
        "escape" | "esc" => Key::Escape,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "tab" => Key::Tab,
        "space" | "spacebar" => Key::Space,
        "arrowup" | "up" => Key::Up,
        "arrowdown" | "down" => Key::Down,
        "arrowleft" | "left" => Key::Left,
        "arrowright" | "right" => Key::Right,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        other => {
            let number: u8 = other.strip_prefix('f')?.parse().ok()?;
            if (1..=12).contains(&number) {
                Key::F(number)
            } else {
                return None;
            }
        }
    };
    Some(key)
}

/// Convert a Key to a display string.
pub fn key_to_string(key: Key) -> String {
    match key {
        Key::Char(c) => c.to_uppercase().collect(),
        Key::Enter => "Enter".to_string(),
        Key::Escape => "Escape".to_string(),
        Key::Backspace => "Backspace".to_string(),
        Key::Delete => "Delete".to_string(),
        Key::Tab => "Tab".to_string(),
        Key::Space => "Space".to_string(),
        Key::Up => "ArrowUp".to_string(),
        Key::Down => "ArrowDown".to_string(),
        Key::Left => "ArrowLeft".to_string(),
        Key::Right => "ArrowRight".to_string(),
        Key::Home => "Home".to_string(),
        Key::End => "End".to_string(),
        Key::PageUp => "PageUp".to_string(),
        Key::PageDown => "PageDown".to_string(),
        Key::F(n) => format!("F{}", n),
    }
}

/// Keys bound through the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Cycles the current item's label
    pub label_rotation: Key,
    /// Opens the label picker
    pub label_dropdown: Key,
    /// Opens the comment editor
    pub comment: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            label_rotation: Key::Enter,
            label_dropdown: Key::Tab,
            comment: Key::F(2),
        }
    }
}

impl KeyBindings {
    /// Resolve the hotkey names from settings, keeping the default for any
    /// name that does not parse.
    pub fn from_config(hotkeys: &HotkeysConfig) -> Self {
        let defaults = Self::default();
        let resolve = |field: &str, name: &str, fallback: Key| match parse_key(name) {
            Some(key) => key,
            None => {
                log::warn!(
                    "Unknown key '{}' for {}, using {}",
                    name,
                    field,
                    key_to_string(fallback)
                );
                fallback
            }
        };

        Self {
            label_rotation: resolve(
                "labelRotation",
                &hotkeys.label_rotation,
                defaults.label_rotation,
            ),
            label_dropdown: resolve(
                "labelDropdown",
                &hotkeys.label_dropdown,
                defaults.label_dropdown,
            ),
            comment: resolve("comment", &hotkeys.comment, defaults.comment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(parse_key("Enter"), Some(Key::Enter));
        assert_eq!(parse_key("ArrowLeft"), Some(Key::Left));
        assert_eq!(parse_key(" "), Some(Key::Space));
        assert_eq!(parse_key("F2"), Some(Key::F(2)));
        assert_eq!(parse_key("x"), Some(Key::Char('x')));
        assert_eq!(parse_key("F13"), None);
        assert_eq!(parse_key("Hyper"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn test_parse_event_with_modifiers() {
        let event = KeyEvent::parse("Ctrl+Shift+z").expect("parse");
        assert_eq!(event.key, Key::Char('z'));
        assert!(event.modifiers.ctrl);
        assert!(event.modifiers.shift);
        assert!(event.modifiers.command());

        let plain = KeyEvent::parse("ArrowDown").expect("parse");
        assert_eq!(plain, KeyEvent::new(Key::Down));

        assert_eq!(KeyEvent::parse("+"), Some(KeyEvent::new(Key::Char('+'))));
        assert_eq!(KeyEvent::parse("Hyper+a"), None);
    }

    #[test]
    fn test_letter_and_digit() {
        assert_eq!(Key::Char('q').letter(), Some('q'));
        assert_eq!(Key::Char('7').letter(), None);
        assert_eq!(Key::Char('7').digit(), Some(7));
        assert_eq!(Key::Enter.digit(), None);
    }

    #[test]
    fn test_matches_ignores_letter_case() {
        assert!(Key::Char('r').matches(Key::Char('R')));
        assert!(!Key::Char('r').matches(Key::Char('t')));
        assert!(Key::Enter.matches(Key::Enter));
    }

    #[test]
    fn test_bindings_from_config_fall_back() {
        let hotkeys = HotkeysConfig {
            label_rotation: "r".to_string(),
            label_dropdown: "Nope".to_string(),
            ..HotkeysConfig::default()
        };
        let bindings = KeyBindings::from_config(&hotkeys);
        assert_eq!(bindings.label_rotation, Key::Char('r'));
        assert_eq!(bindings.label_dropdown, Key::Tab);
        assert_eq!(bindings.comment, Key::F(2));
    }

    #[test]
    fn test_key_to_string() {
        assert_eq!(key_to_string(Key::Char('a')), "A");
        assert_eq!(key_to_string(Key::F(2)), "F2");
        assert_eq!(key_to_string(Key::Left), "ArrowLeft");
    }
}
