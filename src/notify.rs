// src/notify.rs
// =============================================================================
// One-line summaries emitted at the end of every check run.
//
// Each run ends with exactly one notification ("Domain check finished: 2
// items to review"). Where it goes depends on the front end:
// - ConsoleNotifier prints it to stderr (the normal CLI case)
// - SilentNotifier drops it (with --json, so stdout stays machine-readable)
// - tests use a recording notifier to assert on it
// =============================================================================

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn new(title: &str, description: impl Into<String>, variant: Variant) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            variant,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let icon = match notification.variant {
            Variant::Default => "🔔",
            Variant::Destructive => "🚨",
        };
        eprintln!("{} {}: {}", icon, notification.title, notification.description);
    }
}

pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(title = %notification.title, "{}", notification.description);
    }
}
