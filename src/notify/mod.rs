use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// A queued toast. Auto-expires after the configured display window
/// unless dismissed earlier.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
    pub expires_at: DateTime<Utc>,
}

type PageHandler = Arc<dyn Fn(&Notification) + Send + Sync>;

struct Inner {
    toasts: Vec<Toast>,
    handler: Option<PageHandler>,
    next_id: u64,
}

/// Fan-out bridge for user-facing status messages.
///
/// Every `notify` call lands on the toast queue (always active, stacking)
/// and, when a page has registered a handler, is forwarded to it as well
/// for a persistent in-page banner. At most one handler is registered at
/// a time; registering replaces the previous one. Both surfaces are
/// best-effort and non-blocking.
#[derive(Clone)]
pub struct NotificationBridge {
    inner: Arc<Mutex<Inner>>,
    window: Duration,
}

impl NotificationBridge {
    pub fn new() -> Self {
        Self::with_window(Duration::milliseconds(
            config::config().ui.toast_window_ms as i64,
        ))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                toasts: Vec::new(),
                handler: None,
                next_id: 0,
            })),
            window,
        }
    }

    pub fn notify(&self, message: &str, severity: Severity) {
        let notification = Notification {
            message: message.to_string(),
            severity,
        };
        tracing::debug!(severity = %severity, message, "Notification");

        let handler = {
            let now = Utc::now();
            let mut inner = self.inner.lock().unwrap();
            inner.toasts.retain(|t| t.expires_at > now);
            inner.next_id += 1;
            let toast = Toast {
                id: inner.next_id,
                notification: notification.clone(),
                expires_at: now + self.window,
            };
            inner.toasts.push(toast);
            inner.handler.clone()
        };

        // Invoked outside the lock: a handler is free to call back into
        // the bridge without blocking
        if let Some(handler) = handler {
            handler(&notification);
        }
    }

    /// Toasts still within their display window. Expired ones are pruned
    /// as a side effect.
    pub fn active_toasts(&self) -> Vec<Toast> {
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap();
        inner.toasts.retain(|t| t.expires_at > now);
        inner.toasts.clone()
    }

    pub fn dismiss(&self, id: u64) {
        self.inner.lock().unwrap().toasts.retain(|t| t.id != id);
    }

    /// Register the page-level handler. A view registers on mount and must
    /// deregister on unmount so messages never reach a stale handler.
    pub fn register_page_handler<F>(&self, handler: F)
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.inner.lock().unwrap().handler = Some(Arc::new(handler));
    }

    pub fn clear_page_handler(&self) {
        self.inner.lock().unwrap().handler = None;
    }
}

impl Default for NotificationBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_stacks_and_dismisses() {
        let bridge = NotificationBridge::with_window(Duration::seconds(3));
        bridge.notify("saved", Severity::Success);
        bridge.notify("failed", Severity::Error);

        let toasts = bridge.active_toasts();
        assert_eq!(toasts.len(), 2);

        bridge.dismiss(toasts[0].id);
        assert_eq!(bridge.active_toasts().len(), 1);
    }

    #[test]
    fn expired_toasts_are_pruned() {
        let bridge = NotificationBridge::with_window(Duration::milliseconds(-1));
        bridge.notify("gone already", Severity::Info);
        assert!(bridge.active_toasts().is_empty());
    }

    #[test]
    fn notify_prunes_expired_toasts() {
        let bridge = NotificationBridge::with_window(Duration::milliseconds(-1));
        bridge.notify("first, expires immediately", Severity::Info);
        bridge.notify("second", Severity::Info);
        // The first toast was pruned on the second notify, not left to
        // accumulate until someone polls
        assert_eq!(bridge.inner.lock().unwrap().toasts.len(), 1);
    }

    #[test]
    fn handler_may_call_back_into_the_bridge() {
        let bridge = NotificationBridge::with_window(Duration::seconds(3));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reentrant = bridge.clone();
        bridge.register_page_handler(move |n| {
            // A banner surface reading the queue mid-forward must not hang
            sink.lock().unwrap().push((n.message.clone(), reentrant.active_toasts().len()));
        });

        bridge.notify("hello", Severity::Info);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], ("hello".to_string(), 1));
    }

    #[test]
    fn page_handler_receives_and_is_replaced() {
        let bridge = NotificationBridge::with_window(Duration::seconds(3));

        let first = Arc::new(Mutex::new(Vec::new()));
        let sink = first.clone();
        bridge.register_page_handler(move |n| sink.lock().unwrap().push(n.clone()));
        bridge.notify("one", Severity::Info);

        // Registering replaces the previous handler
        let second = Arc::new(Mutex::new(Vec::new()));
        let sink = second.clone();
        bridge.register_page_handler(move |n| sink.lock().unwrap().push(n.clone()));
        bridge.notify("two", Severity::Warning);

        assert_eq!(first.lock().unwrap().len(), 1);
        assert_eq!(second.lock().unwrap().len(), 1);
        assert_eq!(second.lock().unwrap()[0].message, "two");

        bridge.clear_page_handler();
        bridge.notify("three", Severity::Error);
        assert_eq!(second.lock().unwrap().len(), 1);
        // Toast surface is unaffected by handler lifecycle
        assert_eq!(bridge.active_toasts().len(), 3);
    }
}
