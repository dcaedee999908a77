use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;

/// Toasts disappear on the client after this long; older ones are not delivered.
pub const NOTICE_TTL: Duration = Duration::from_millis(3000);
const MAX_PENDING: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip)]
    raised_at: Instant,
}

/// Per-viewer toast queue. Cloned into background workers.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    pending: Arc<Mutex<VecDeque<Notice>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) {
        let mut pending = self.pending.lock();
        if pending.len() == MAX_PENDING {
            pending.pop_front();
        }
        pending.push_back(Notice {
            level,
            message: message.into(),
            raised_at: Instant::now(),
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    /// Takes every notice still within its display window.
    pub fn drain(&self, now: Instant) -> Vec<Notice> {
        self.pending
            .lock()
            .drain(..)
            .filter(|n| now.saturating_duration_since(n.raised_at) < NOTICE_TTL)
            .collect()
    }
}
