//! Transient error banner.

use std::time::Duration;

use web_time::Instant;

use crate::constants::NOTIFICATION_DURATION;

/// A message shown until its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub expires_at: Instant,
}

/// Holds at most one banner; a newer one replaces the older.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    current: Option<Notification>,
    duration: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self {
            current: None,
            duration: NOTIFICATION_DURATION,
        }
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an error banner.
    pub fn error(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        log::warn!("🔔 {}", message);
        self.current = Some(Notification {
            message,
            expires_at: now + self.duration,
        });
    }

    /// Drop the banner once it has expired.
    pub fn tick(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.current = None;
        }
    }

    /// The visible banner, if any.
    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}
