//! Actions dispatched into the app loop by background tasks.

use sitewatch_core::SiteKey;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A transient user-facing notice shown in the footer.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Messages from background tasks to the app loop. Every action is
/// followed by a redraw, so no state change is left un-rendered.
#[derive(Debug)]
pub enum Action {
    /// The monitor's state changed (roster, checking flag, last-check).
    StateChanged,
    /// A history fetch for one site identity completed.
    HistoryLoaded(SiteKey),
    /// Show a notification toast.
    Notify(Notification),
}
