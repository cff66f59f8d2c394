//! Notifier port for user-visible alerts.
//!
//! The state machines report validation problems, provider rejections and
//! per-repository failures through a `Notifier` instead of printing. The CLI
//! renders alerts on the terminal; tests record them.

use std::sync::{Arc, Mutex};

use grepchat_types::alert::{Alert, AlertLevel};

/// Sink for alerts shown to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, alert: Alert);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, alert: Alert) {
        (**self).notify(alert)
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, alert: Alert) {
        (**self).notify(alert)
    }
}

/// Notifier that keeps every alert in memory.
///
/// Used by non-interactive surfaces that print alerts after the fact, and
/// by tests that assert on what the user would have seen.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all alerts raised so far.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Alerts of a single level, in the order they were raised.
    pub fn alerts_at(&self, level: AlertLevel) -> Vec<Alert> {
        self.alerts()
            .into_iter()
            .filter(|a| a.level == level)
            .collect()
    }

    /// Remove and return all recorded alerts.
    pub fn drain(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .map(|mut a| std::mem::take(&mut *a))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, alert: Alert) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert);
        }
    }
}
