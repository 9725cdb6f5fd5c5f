//! Ephemeral toast channel.
//!
//! Exactly one message is live at a time. Publishing replaces the live message
//! and re-arms the auto-dismiss timer; the previous timer is always cancelled
//! first, so an older message can never dismiss a newer one. There is no
//! queue: rapid successive messages drop the intermediate ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub id: u64,
    pub text: String,
    pub severity: Severity,
    pub created_at: Instant,
    pub expires_at: Instant,
}

type Slot = watch::Sender<Option<NotificationMessage>>;

struct Inner {
    slot: Arc<Slot>,
    timer: Mutex<Option<JoinHandle<()>>>,
    next_id: AtomicU64,
    dismiss_after: Duration,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = timer.take() {
            task.abort();
        }
    }
}

/// Publish/subscribe handle. Clones share the same live message.
#[derive(Clone)]
pub struct NotificationBus {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("current", &*self.inner.slot.borrow())
            .field("dismiss_after", &self.inner.dismiss_after)
            .finish()
    }
}

impl NotificationBus {
    pub fn new(dismiss_after: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                slot: Arc::new(slot),
                timer: Mutex::new(None),
                next_id: AtomicU64::new(1),
                dismiss_after,
            }),
        }
    }

    /// Show `text`, replacing whatever is live, and arm the dismiss timer.
    ///
    /// Must be called from inside a Tokio runtime (the timer is a task).
    pub fn notify(&self, text: impl Into<String>, severity: Severity) -> u64 {
        let mut timer = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = timer.take() {
            prev.abort();
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let message = NotificationMessage {
            id,
            text: text.into(),
            severity,
            created_at: now,
            expires_at: now + self.inner.dismiss_after,
        };
        tracing::debug!(id, ?severity, "notify: {}", message.text);
        self.inner.slot.send_replace(Some(message));

        let slot = Arc::clone(&self.inner.slot);
        let dismiss_after = self.inner.dismiss_after;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            // Only ever clear the message this timer was armed for.
            slot.send_if_modified(|current| {
                if current.as_ref().is_some_and(|m| m.id == id) {
                    *current = None;
                    true
                } else {
                    false
                }
            });
        }));
        id
    }

    pub fn info(&self, text: impl Into<String>) -> u64 {
        self.notify(text, Severity::Info)
    }

    pub fn success(&self, text: impl Into<String>) -> u64 {
        self.notify(text, Severity::Success)
    }

    pub fn error(&self, text: impl Into<String>) -> u64 {
        self.notify(text, Severity::Error)
    }

    /// Hide the live message now and cancel its timer.
    pub fn dismiss(&self) {
        let mut timer = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = timer.take() {
            prev.abort();
        }
        self.inner.slot.send_replace(None);
    }

    /// The live message, if any.
    pub fn current(&self) -> Option<NotificationMessage> {
        self.inner.slot.borrow().clone()
    }

    /// Receive every change of the live message (including dismissal).
    pub fn subscribe(&self) -> watch::Receiver<Option<NotificationMessage>> {
        self.inner.slot.subscribe()
    }

    pub fn dismiss_after(&self) -> Duration {
        self.inner.dismiss_after
    }
}
