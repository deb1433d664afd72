//! Transient user-facing notices raised by the data layer.

use std::sync::Mutex;

/// Severity of a notice, mirroring the alert styles of the front ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// The action completed against the server
    Success,
    /// The action completed locally and awaits a sync sweep
    Pending,
    /// The action failed
    Error,
}

/// A message meant for the user, not the log
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

    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Pending,
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

/// Sink for notices; the presentation layer decides how to show them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Pending => {
                tracing::info!(level = ?notice.level, "{}", notice.message);
            }
            NoticeLevel::Error => tracing::warn!("{}", notice.message),
        }
    }
}

/// Keeps notices until the caller drains them.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every notice collected so far.
    pub fn drain(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_notifier_drains_in_order() {
        let notifier = CollectingNotifier::new();
        notifier.notify(Notice::success("first"));
        notifier.notify(Notice::pending("second"));

        let notices = notifier.drain();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[1].message, "second");
        assert!(notifier.drain().is_empty());
    }
}
