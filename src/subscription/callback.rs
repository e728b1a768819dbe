// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for projected state.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::projector::{ProjectionObserver, ProjectorKind, ProjectorStatus};
use crate::state::{RelaySnapshot, ScheduleConfig};

/// Unique identifier for a subscription.
///
/// Returned when registering a callback; pass it to
/// [`CallbackRegistry::unsubscribe`] to remove the callback. IDs are unique
/// within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type RelaysCallback = Arc<dyn Fn(&RelaySnapshot) + Send + Sync>;
type ScheduleCallback = Arc<dyn Fn(&ScheduleConfig) + Send + Sync>;
type StatusCallback = Arc<dyn Fn(ProjectorKind, &ProjectorStatus) + Send + Sync>;

/// Registry of callbacks reacting to projector updates.
///
/// The registry is a [`ProjectionObserver`] for both projected types, so it
/// can be handed straight to the projectors. Callbacks then run on the
/// projector task, after the matching watch channel was updated.
///
/// # Thread Safety
///
/// Registration and dispatch may happen from any thread. Callbacks are
/// called without any registry lock held, so a callback may itself
/// register or unsubscribe.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    relays_callbacks: RwLock<HashMap<SubscriptionId, RelaysCallback>>,
    schedule_callbacks: RwLock<HashMap<SubscriptionId, ScheduleCallback>>,
    status_callbacks: RwLock<HashMap<SubscriptionId, StatusCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            relays_callbacks: RwLock::new(HashMap::new()),
            schedule_callbacks: RwLock::new(HashMap::new()),
            status_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for relay snapshot changes.
    pub fn on_relays_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&RelaySnapshot) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.relays_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for schedule configuration changes.
    pub fn on_schedule_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ScheduleConfig) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.schedule_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for projector status changes.
    pub fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ProjectorKind, &ProjectorStatus) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.status_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.relays_callbacks.write().remove(&id).is_some()
            || self.schedule_callbacks.write().remove(&id).is_some()
            || self.status_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.relays_callbacks.write().clear();
        self.schedule_callbacks.write().clear();
        self.status_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Calls every relay callback with `relays`.
    pub fn dispatch_relays(&self, relays: &RelaySnapshot) {
        let callbacks: Vec<RelaysCallback> = self.relays_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(relays);
        }
    }

    /// Calls every schedule callback with `schedule`.
    pub fn dispatch_schedule(&self, schedule: &ScheduleConfig) {
        let callbacks: Vec<ScheduleCallback> =
            self.schedule_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(schedule);
        }
    }

    /// Calls every status callback.
    pub fn dispatch_status(&self, kind: ProjectorKind, status: &ProjectorStatus) {
        let callbacks: Vec<StatusCallback> =
            self.status_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(kind, status);
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.relays_callbacks.read().len()
            + self.schedule_callbacks.read().len()
            + self.status_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl ProjectionObserver<RelaySnapshot> for CallbackRegistry {
    fn value_changed(&self, _kind: ProjectorKind, value: &RelaySnapshot) {
        self.dispatch_relays(value);
    }

    fn status_changed(&self, kind: ProjectorKind, status: &ProjectorStatus) {
        self.dispatch_status(kind, status);
    }
}

impl ProjectionObserver<ScheduleConfig> for CallbackRegistry {
    fn value_changed(&self, _kind: ProjectorKind, value: &ScheduleConfig) {
        self.dispatch_schedule(value);
    }

    fn status_changed(&self, kind: ProjectorKind, status: &ProjectorStatus) {
        self.dispatch_status(kind, status);
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use serde_json::json;

    use super::*;
    use crate::store::Snapshot;

    fn relays(value: serde_json::Value) -> RelaySnapshot {
        RelaySnapshot::decode(&Snapshot::new(Some("relay"), value))
    }

    #[test]
    fn subscription_id_display() {
        assert_eq!(SubscriptionId::new(42).to_string(), "Sub(42)");
    }

    #[test]
    fn ids_are_unique() {
        let registry = CallbackRegistry::new();
        let a = registry.on_relays_changed(|_| {});
        let b = registry.on_schedule_changed(|_| {});
        let c = registry.on_status_changed(|_, _| {});
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(registry.callback_count(), 3);
    }

    #[test]
    fn relays_callback_and_unsubscribe() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let id = registry.on_relays_changed(move |snapshot| {
            assert_eq!(snapshot.get("relay1"), Some(true));
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch_relays(&relays(json!({"relay1": true})));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(registry.unsubscribe(id));
        assert!(registry.is_empty());
        assert!(!registry.unsubscribe(id));

        registry.dispatch_relays(&relays(json!({"relay1": true})));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn schedule_callback_receives_value() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(RwLock::new(None::<ScheduleConfig>));
        let received_clone = Arc::clone(&received);

        registry.on_schedule_changed(move |schedule| {
            *received_clone.write() = Some(schedule.clone());
        });

        let schedule = ScheduleConfig {
            enabled: true,
            ..ScheduleConfig::default()
        };
        registry.dispatch_schedule(&schedule);
        assert_eq!(*received.read(), Some(schedule));
    }

    #[test]
    fn observer_routes_by_type() {
        let registry = CallbackRegistry::new();
        let relay_hits = Arc::new(AtomicU32::new(0));
        let status_hits = Arc::new(AtomicU32::new(0));
        let r = Arc::clone(&relay_hits);
        let s = Arc::clone(&status_hits);
        registry.on_relays_changed(move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_status_changed(move |kind, status| {
            assert_eq!(kind, ProjectorKind::Schedule);
            assert!(status.is_live());
            s.fetch_add(1, Ordering::SeqCst);
        });

        ProjectionObserver::<ScheduleConfig>::value_changed(
            &registry,
            ProjectorKind::Schedule,
            &ScheduleConfig::default(),
        );
        ProjectionObserver::<ScheduleConfig>::status_changed(
            &registry,
            ProjectorKind::Schedule,
            &ProjectorStatus::Live,
        );

        assert_eq!(relay_hits.load(Ordering::SeqCst), 0);
        assert_eq!(status_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let id_slot = Arc::new(RwLock::new(None::<SubscriptionId>));
        let weak = Arc::downgrade(&registry);
        let slot = Arc::clone(&id_slot);

        let id = registry.on_relays_changed(move |_| {
            if let (Some(registry), Some(id)) = (weak.upgrade(), *slot.read()) {
                registry.unsubscribe(id);
            }
        });
        *id_slot.write() = Some(id);

        registry.dispatch_relays(&RelaySnapshot::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let registry = CallbackRegistry::new();
        registry.on_relays_changed(|_| {});
        registry.on_status_changed(|_, _| {});
        registry.clear();
        assert!(registry.is_empty());
    }
}
