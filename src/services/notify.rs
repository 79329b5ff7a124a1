use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Loading,
    Success,
    Error,
    Info,
}

/// A transient message for the customer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: ToastLevel, message: &str);
}

/// Collects toasts raised while handling one request so they can be
/// returned with the response.
#[derive(Debug, Default)]
pub struct ToastBuffer {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Toast> {
        match self.toasts.lock() {
            Ok(mut toasts) => std::mem::take(&mut *toasts),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for ToastBuffer {
    fn notify(&self, level: ToastLevel, message: &str) {
        match level {
            ToastLevel::Error => tracing::warn!(message, "error toast"),
            _ => tracing::debug!(?level, message, "toast"),
        }
        let toast = Toast {
            level,
            message: message.to_string(),
        };
        match self.toasts.lock() {
            Ok(mut toasts) => toasts.push(toast),
            Err(poisoned) => poisoned.into_inner().push(toast),
        }
    }
}
