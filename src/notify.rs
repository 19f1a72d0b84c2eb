use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
}

/// A user-facing message: a short headline plus a longer description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub description: String,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        message: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Notification {
            kind,
            message: message.into(),
            description: description.into(),
        }
    }

    pub fn success(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message, description)
    }

    pub fn error(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message, description)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        match self.seen.lock() {
            Ok(mut seen) => std::mem::take(&mut *seen),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        match self.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        match self.seen.lock() {
            Ok(mut seen) => seen.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

/// Writes notifications to the log; used where there is no page to show them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: Notification) {
        match n.kind {
            NotificationKind::Success => info!("{}: {}", n.message, n.description),
            NotificationKind::Warning => warn!("{}: {}", n.message, n.description),
            NotificationKind::Error => error!("{}: {}", n.message, n.description),
        }
    }
}

#[derive(Debug, Error)]
#[error("could not open {link}: {reason}")]
pub struct OpenError {
    pub link: String,
    pub reason: String,
}

/// Opens a document link in a new viewing context.
pub trait LinkOpener: Send + Sync {
    fn open(&self, link: &str) -> Result<(), OpenError>;
}

/// Remembers the link so the browser page can open it in a new tab.
#[derive(Debug, Default)]
pub struct DeferredLinkOpener {
    link: Mutex<Option<String>>,
}

impl DeferredLinkOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<String> {
        match self.link.lock() {
            Ok(mut link) => link.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl LinkOpener for DeferredLinkOpener {
    fn open(&self, link: &str) -> Result<(), OpenError> {
        let mut slot = self.link.lock().map_err(|e| OpenError {
            link: link.to_string(),
            reason: e.to_string(),
        })?;
        *slot = Some(link.to_string());
        Ok(())
    }
}

/// Hands the link to the operating system's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLinkOpener;

impl LinkOpener for SystemLinkOpener {
    fn open(&self, link: &str) -> Result<(), OpenError> {
        open::that(link).map_err(|e| OpenError {
            link: link.to_string(),
            reason: e.to_string(),
        })
    }
}
