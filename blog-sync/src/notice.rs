//! Transient user-facing notices.
//!
//! A notice disappears on its own once its TTL has passed. Nothing here owns
//! a timer: callers pass the current time, and the UI schedules a re-render
//! for [`NoticeBoard::expires_at`].

use chrono::{DateTime, Duration, Utc};

use crate::error::SyncError;

pub const POST_ADDED: &str = "Post added successfully!";
pub const TAG_ADDED: &str = "Tag added successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Holds at most one notice; raising a new one replaces the old.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeBoard {
    current: Option<Notice>,
    ttl: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(Duration::seconds(3))
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn raise_error(&mut self, message: impl Into<String>) -> &Notice {
        self.raise_at(NoticeKind::Error, message, Utc::now())
    }

    pub fn raise_info(&mut self, message: impl Into<String>) -> &Notice {
        self.raise_at(NoticeKind::Info, message, Utc::now())
    }

    pub fn raise_at(
        &mut self,
        kind: NoticeKind,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &Notice {
        self.current.insert(Notice {
            kind,
            message: message.into(),
            raised_at: now,
        })
    }

    /// Log `error` and show it as an error notice. Hands the error back so
    /// callers can `return Err(board.report(e))`.
    pub fn report(&mut self, error: SyncError) -> SyncError {
        match &error {
            SyncError::Transport { detail } => {
                tracing::warn!(%detail, "Blog service unreachable");
            }
            SyncError::Validation(_) | SyncError::NoEditInProgress => {
                tracing::debug!(error = %error, "Rejected locally");
            }
            other => tracing::warn!(error = %other, "Operation failed"),
        }
        self.raise_error(error.to_string());
        error
    }

    /// The notice as last raised, expired or not.
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// The notice if it is still within its TTL at `now`.
    pub fn visible(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|notice| now < notice.raised_at + self.ttl)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.current.as_ref().map(|notice| notice.raised_at + self.ttl)
    }

    /// Drop the notice if it has expired. Returns whether one was dropped.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if self.current.is_some() && self.visible(now).is_none() {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
