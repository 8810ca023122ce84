//! User-facing notices
//!
//! Sessions never print. Everything the user should see (errors, validation
//! messages, payment outcomes) goes through a [`Notifier`].

use parking_lot::Mutex;
use std::fmt;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// One message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

impl Notice {
    #[must_use]
    pub fn new(kind: NoticeKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, title, body)
    }

    #[must_use]
    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title, body)
    }

    #[must_use]
    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, title, body)
    }

    #[must_use]
    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, title, body)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.body)
    }
}

/// Sink for notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Forwards notices to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => tracing::error!(title = %notice.title, "{}", notice.body),
            NoticeKind::Warning => tracing::warn!(title = %notice.title, "{}", notice.body),
            NoticeKind::Info | NoticeKind::Success => {
                tracing::info!(title = %notice.title, "{}", notice.body);
            }
        }
    }
}

/// Records every notice in order
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Drain recorded notices
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_records_in_order_and_drains() {
        let log = NoticeLog::new();
        log.notify(Notice::error("Save Error", "HTTP 500"));
        log.notify(Notice::info("Cancelled", "Payment was cancelled."));
        assert_eq!(log.len(), 2);
        assert_eq!(log.notices()[0].to_string(), "Save Error: HTTP 500");

        let drained = log.take();
        assert_eq!(drained[1].kind, NoticeKind::Info);
        assert!(log.is_empty());
    }
}
