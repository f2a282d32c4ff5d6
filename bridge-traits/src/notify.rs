//! User-facing notification sink.
//!
//! The core reports the outcome of user-initiated actions (a failed fetch,
//! a created album, a rolled-back favorite) through this sink. Exact wording
//! and presentation are host concerns; the contract is one notice per
//! outcome.

use std::fmt;

/// Notice severity shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// A user action completed.
    Success,
    /// A user action was accepted but did nothing (e.g. playing an empty
    /// album).
    Info,
    /// A user action failed or was rolled back.
    Error,
}

/// A single human-readable notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{}] {}", level, self.message)
    }
}

/// Trait for surfacing notices to the user.
///
/// Implementations route to toasts, status bars, system notifications, or
/// whatever the host prefers. Must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Console notifier for development and tests.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("{}", notice);
    }
}
