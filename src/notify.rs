//! Transient user notifications.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// How long the notification stays visible
    pub duration: Duration,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification {
            kind: NotificationKind::Success,
            message: message.to_string(),
            duration: Duration::from_secs(2),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notification {
            kind: NotificationKind::Error,
            message: message.to_string(),
            duration: Duration::from_secs(4),
        });
    }
}

/// Keeps every notification in order and mirrors it to the log.
#[derive(Debug, Default)]
pub struct Toaster {
    shown: Mutex<Vec<Notification>>,
}

impl Toaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.shown.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Removes and returns everything shown so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.shown.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for Toaster {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!("{}", notification.message),
            NotificationKind::Error => tracing::warn!("{}", notification.message),
        }
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
