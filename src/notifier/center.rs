// Transient user-facing message queue.
use crate::model::{Notification, Severity};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use tracing::debug;

struct CenterState {
    next_id: u64,
    items: Vec<Notification>,
}

/// Queues notifications with a fixed default lifetime. Duplicates are kept
/// independent: identical messages each get their own entry and timer.
/// Expired entries are pruned lazily on access, so no per-entry timer task
/// is needed.
#[derive(Clone)]
pub struct NotificationCenter {
    default_ttl_ms: u64,
    state: Arc<Mutex<CenterState>>,
}

impl NotificationCenter {
    pub fn new(default_ttl_ms: u64) -> Self {
        Self {
            default_ttl_ms,
            state: Arc::new(Mutex::new(CenterState { next_id: 0, items: Vec::new() })),
        }
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> Notification {
        let message = message.into();
        debug!("Notification ({:?}): {}", severity, message);

        let mut state = self.state.lock().expect("notification state poisoned");
        let now = Utc::now();
        Self::prune(&mut state, now);

        let notification = Notification {
            id: state.next_id,
            message,
            severity,
            created_at: now,
            ttl_ms: self.default_ttl_ms,
        };
        state.next_id += 1;
        state.items.push(notification.clone());
        notification
    }

    /// Retires one notification early. Returns false when it already expired
    /// or was never queued.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = self.state.lock().expect("notification state poisoned");
        Self::prune(&mut state, Utc::now());
        let before = state.items.len();
        state.items.retain(|n| n.id != id);
        state.items.len() < before
    }

    /// Live notifications in creation order.
    pub fn active(&self) -> Vec<Notification> {
        self.active_at(Utc::now())
    }

    fn active_at(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut state = self.state.lock().expect("notification state poisoned");
        Self::prune(&mut state, now);
        state.items.clone()
    }

    fn prune(state: &mut CenterState, now: DateTime<Utc>) {
        state
            .items
            .retain(|n| n.created_at + Duration::milliseconds(n.ttl_ms as i64) > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_expires_after_ttl() {
        let center = NotificationCenter::new(5_000);
        let created = center.notify("price updated", Severity::Success);
        assert_eq!(center.active().len(), 1);

        let just_before = created.created_at + Duration::milliseconds(4_999);
        assert_eq!(center.active_at(just_before).len(), 1);

        let after = created.created_at + Duration::milliseconds(5_000);
        assert!(center.active_at(after).is_empty());
    }

    #[test]
    fn duplicates_are_kept_separately() {
        let center = NotificationCenter::new(5_000);
        let first = center.notify("data unavailable", Severity::Error);
        let second = center.notify("data unavailable", Severity::Error);
        assert_ne!(first.id, second.id);
        assert_eq!(center.active().len(), 2);
    }

    #[test]
    fn dismiss_retires_one_entry() {
        let center = NotificationCenter::new(5_000);
        let kept = center.notify("a", Severity::Info);
        let dismissed = center.notify("b", Severity::Warning);

        assert!(center.dismiss(dismissed.id));
        assert!(!center.dismiss(dismissed.id));

        let active = center.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, kept.id);
    }

    #[test]
    fn active_preserves_creation_order() {
        let center = NotificationCenter::new(5_000);
        center.notify("first", Severity::Info);
        center.notify("second", Severity::Info);
        let messages: Vec<String> =
            center.active().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }
}
