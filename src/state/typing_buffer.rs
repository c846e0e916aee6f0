//! Typed-acronym buffer with an idle deadline.
//!
//! Every keypress restarts the deadline; once it passes without further
//! input the buffer empties itself on the next `tick`.

use std::time::Duration;

use web_time::Instant;

use crate::constants::TYPING_BUFFER_TIMEOUT;

/// Letters typed so far, uppercased.
#[derive(Debug, Clone)]
pub struct TypingBuffer {
    text: String,
    deadline: Option<Instant>,
    timeout: Duration,
}

impl Default for TypingBuffer {
    fn default() -> Self {
        Self::with_timeout(TYPING_BUFFER_TIMEOUT)
    }
}

impl TypingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            text: String::new(),
            deadline: None,
            timeout,
        }
    }

    /// Append a letter and re-arm the deadline. Returns the buffer contents.
    ///
    /// A buffer whose deadline already passed is emptied first, so a stale
    /// prefix never leaks into a new word even if `tick` was not called.
    pub fn push(&mut self, letter: char, now: Instant) -> &str {
        self.tick(now);
        self.text.extend(letter.to_uppercase());
        self.deadline = Some(now + self.timeout);
        &self.text
    }

    /// Replace the contents with a single letter and re-arm the deadline.
    pub fn restart(&mut self, letter: char, now: Instant) -> &str {
        self.text.clear();
        self.push(letter, now)
    }

    /// Empty the buffer and cancel the deadline.
    pub fn clear(&mut self) {
        if !self.text.is_empty() {
            log::debug!("⌨️ Typing buffer cleared ('{}')", self.text);
        }
        self.text.clear();
        self.deadline = None;
    }

    /// Expire the buffer if its deadline has passed. Returns true if it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// When the buffer will expire, if it is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
