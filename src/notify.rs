// SPDX-License-Identifier: GPL-3.0-only

//! Fire-and-forget user notifications
//!
//! Producers raise notifications without caring who displays them. The
//! terminal UI renders them as transient toasts; headless runs log them.

use std::sync::Mutex;
use std::sync::mpsc::Sender;
use tracing::{error, info, warn};

/// Notification severity, controls presentation only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Short tag used in textual output
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A single user-facing notification
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }
}

/// Notification sink. Delivery is fire-and-forget: no return value,
/// failures to deliver are swallowed by the implementation.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that emits tracing events, used by headless runs
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info | Severity::Success => {
                info!(
                    title = %notification.title,
                    description = %notification.description,
                    "notification"
                );
            }
            Severity::Warning => {
                warn!(
                    title = %notification.title,
                    description = %notification.description,
                    "notification"
                );
            }
            Severity::Error => {
                error!(
                    title = %notification.title,
                    description = %notification.description,
                    "notification"
                );
            }
        }
    }
}

/// Notifier that forwards into an mpsc channel.
///
/// The terminal UI drains the receiver to show toasts; tests use it to
/// assert on raised notifications. A closed receiver drops the message.
pub struct ChannelNotifier {
    sender: Mutex<Sender<Notification>>,
}

impl ChannelNotifier {
    pub fn new(sender: Sender<Notification>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(sender) = self.sender.lock() {
            let _ = sender.send(notification);
        }
    }
}
