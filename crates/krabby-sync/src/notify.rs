//! # Notification Center
//!
//! One visible notice at a time. A new notice replaces the current one and
//! every notice clears itself after a fixed window unless a newer one took
//! its place first.
//!
//! ```text
//!   raise("A")        raise("B")                       expiry(B)
//!   ──●─────────────────●──────────────────────────────────●────▶ t
//!     │ slot = A        │ slot = B (A's timer cancelled)   │ slot = None
//!     │                 │◀──────────── visible_for ───────▶│
//! ```
//!
//! Subscribers watch the slot through a `tokio::sync::watch` channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::FailureKind;

/// How long a notice stays up by default.
pub const DEFAULT_VISIBLE_FOR: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Danger,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Danger => "danger",
        })
    }
}

/// A transient message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Increases by one per raise, starting at 1.
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    /// Set for failures.
    pub kind: Option<FailureKind>,
    pub raised_at: Instant,
    pub expires_at: Instant,
}

struct Inner {
    slot: watch::Sender<Option<Notification>>,
    next_id: AtomicU64,
    expiry: Mutex<Option<JoinHandle<()>>>,
    visible_for: Duration,
}

impl Inner {
    /// Clears the slot only if `id` is still the one showing.
    fn expire(&self, id: u64) {
        let cleared = self.slot.send_if_modified(|current| match current {
            Some(n) if n.id == id => {
                *current = None;
                true
            }
            _ => false,
        });
        if cleared {
            debug!(id, "Notification expired");
        }
    }
}

/// Cheap-to-clone handle on the single notification slot.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBLE_FOR)
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("current", &*self.inner.slot.borrow())
            .field("visible_for", &self.inner.visible_for)
            .finish()
    }
}

impl NotificationCenter {
    pub fn new(visible_for: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        NotificationCenter {
            inner: Arc::new(Inner {
                slot,
                next_id: AtomicU64::new(1),
                expiry: Mutex::new(None),
                visible_for,
            }),
        }
    }

    pub fn visible_for(&self) -> Duration {
        self.inner.visible_for
    }

    /// Shows `message`, replacing whatever is visible, and returns its id.
    ///
    /// Auto-expiry needs a Tokio runtime; outside one the notice stays up
    /// until replaced or cleared.
    pub fn raise(&self, message: impl Into<String>, severity: Severity) -> u64 {
        self.publish(message.into(), severity, None)
    }

    /// Shows a danger notice tagged with the failure category.
    pub fn raise_failure(&self, message: impl Into<String>, kind: FailureKind) -> u64 {
        self.publish(message.into(), Severity::Danger, Some(kind))
    }

    fn publish(&self, message: String, severity: Severity, kind: Option<FailureKind>) -> u64 {
        // Slot write and timer swap happen under one lock so the surviving
        // timer always belongs to the notice left in the slot.
        let mut expiry = self.lock_expiry();

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let raised_at = Instant::now();
        let visible_for = self.inner.visible_for;

        debug!(id, %severity, %message, "Notification raised");
        self.inner.slot.send_replace(Some(Notification {
            id,
            message,
            severity,
            kind,
            raised_at,
            expires_at: raised_at + visible_for,
        }));

        let timer = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let weak: Weak<Inner> = Arc::downgrade(&self.inner);
                Some(runtime.spawn(async move {
                    tokio::time::sleep(visible_for).await;
                    if let Some(inner) = weak.upgrade() {
                        inner.expire(id);
                    }
                }))
            }
            Err(_) => {
                warn!(id, "No runtime; notification will not auto-expire");
                None
            }
        };

        if let Some(previous) = std::mem::replace(&mut *expiry, timer) {
            previous.abort();
        }

        id
    }

    /// Dismisses whatever is showing.
    pub fn clear(&self) {
        let mut expiry = self.lock_expiry();
        if let Some(timer) = expiry.take() {
            timer.abort();
        }
        self.inner.slot.send_replace(None);
    }

    fn lock_expiry(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        // The guarded handle is always left consistent, so a poisoned lock is
        // still usable.
        self.inner
            .expiry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The visible notice, if any.
    pub fn current(&self) -> Option<Notification> {
        self.inner.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.slot.subscribe()
    }
}
