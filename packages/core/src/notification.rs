//! Toast notifications

use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

/// Active notifications, oldest first
#[derive(Debug, Clone)]
pub struct Notifier {
    next_id: u64,
    lifetime: Duration,
    active: VecDeque<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl Notifier {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            next_id: 0,
            lifetime,
            active: VecDeque::new(),
        }
    }

    /// How long the caller should wait before dismissing a notification
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        self.active.push_back(Notification {
            id: self.next_id,
            kind,
            message: message.into(),
        });
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, message)
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
