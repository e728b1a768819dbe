// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests of a sync session against the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use relaysync_lib::session::{LocalIdentity, Session, SyncConfig, SyncSession};
use relaysync_lib::store::{MemoryStore, StorePath};
use relaysync_lib::subscription::Subscribable;
use relaysync_lib::types::{DeviceKey, ScheduleTime};
use relaysync_lib::{ProjectorKind, ProjectorStatus, RelaySnapshot};
use serde_json::{Value, json};

fn start(store: &Arc<MemoryStore>) -> SyncSession<MemoryStore> {
    SyncSession::start(
        Arc::clone(store),
        Session::new(LocalIdentity::signed_in()),
        SyncConfig::default(),
    )
    .unwrap()
}

fn key(k: &str) -> DeviceKey {
    DeviceKey::new(k).unwrap()
}

fn store_path(p: &str) -> StorePath {
    StorePath::new(p).unwrap()
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn writes(store: &MemoryStore) -> Vec<(String, Value)> {
    store
        .take_writes()
        .into_iter()
        .map(|w| (w.path.to_string(), w.value))
        .collect()
}

// ============================================================================
// Relay projection
// ============================================================================

mod relays {
    use super::*;

    #[tokio::test]
    async fn snapshot_mirrors_store() {
        let store = Arc::new(MemoryStore::with_data(json!({
            "relay": {"relay1": true, "relay2": false}
        })));
        let sync = start(&store);

        let mut relays = sync.watch_relays();
        relays.wait_for(|r| r.len() == 2).await.unwrap();

        let expected: RelaySnapshot = [(key("relay1"), true), (key("relay2"), false)]
            .into_iter()
            .collect();
        assert_eq!(sync.relays(), expected);
    }

    #[tokio::test]
    async fn toggle_all_off_issues_one_write_per_key() {
        let store = Arc::new(MemoryStore::with_data(json!({
            "relay": {"relay1": true, "relay2": false}
        })));
        let sync = start(&store);
        let mut relays = sync.watch_relays();
        relays.wait_for(|r| r.len() == 2).await.unwrap();

        let issued = sync.dispatcher().set_all_relays(false).unwrap();

        assert_eq!(issued, 2);
        assert_eq!(
            writes(&store),
            [
                ("relay/relay1".to_string(), json!(false)),
                ("relay/relay2".to_string(), json!(false)),
            ]
        );
        // The local snapshot only changes once the store notifies.
        assert_eq!(sync.relays().get("relay1"), Some(true));

        relays.wait_for(|r| !r.is_on("relay1")).await.unwrap();
        assert_eq!(sync.relays().active_count(), 0);
    }

    #[tokio::test]
    async fn toggle_all_before_first_snapshot_writes_nothing() {
        let store = Arc::new(MemoryStore::with_data(json!({"relay": {"relay1": true}})));
        let sync = start(&store);

        // The projector task has not run yet.
        assert_eq!(sync.dispatcher().set_all_relays(true).unwrap(), 0);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn removal_at_source_drops_key() {
        let store = Arc::new(MemoryStore::with_data(json!({
            "relay": {"relay1": true, "relay9": false}
        })));
        let sync = start(&store);
        let mut relays = sync.watch_relays();
        relays.wait_for(|r| r.len() == 2).await.unwrap();

        store.seed(&store_path("relay/relay9"), Value::Null);
        relays.wait_for(|r| r.len() == 1).await.unwrap();
        assert_eq!(sync.relays().get("relay9"), None);
    }

    #[tokio::test]
    async fn single_relay_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let sync = start(&store);

        sync.dispatcher().set_relay(&key("relay4"), true).unwrap();

        let mut relays = sync.watch_relays();
        relays.wait_for(|r| r.is_on("relay4")).await.unwrap();
        assert_eq!(store.get(&store_path("relay/relay4")).as_bool(), Some(true));
    }
}

// ============================================================================
// Schedule projection
// ============================================================================

mod schedule {
    use super::*;

    #[tokio::test]
    async fn schedule_commands_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let sync = start(&store);
        let dispatcher = sync.dispatcher();

        dispatcher.set_on_time(ScheduleTime::new(18, 0).unwrap()).unwrap();
        dispatcher.set_off_time(ScheduleTime::new(0, 5).unwrap()).unwrap();
        dispatcher.set_device_scheduled(&key("relay2"), true).unwrap();
        dispatcher.set_schedule_enabled(true).unwrap();

        let mut schedule = sync.watch_schedule();
        schedule.wait_for(|s| s.enabled).await.unwrap();

        let schedule = sync.schedule();
        assert_eq!(schedule.on_time_raw, "6:00 PM");
        assert_eq!(schedule.off_time_raw, "12:05 AM");
        assert_eq!(schedule.on_time(), Some(ScheduleTime::new(18, 0).unwrap()));
        assert!(schedule.is_scheduled("relay2"));
        assert_eq!(schedule.scheduled_devices.len(), 1);
    }

    #[tokio::test]
    async fn reserved_fields_are_not_device_flags() {
        let store = Arc::new(MemoryStore::with_data(json!({
            "schedule": {
                "enabled": true,
                "onTime": "7:00 PM",
                "offTime": "6:00 AM",
                "relay1": true,
                "note": true,
            }
        })));
        let sync = start(&store);
        let mut schedule = sync.watch_schedule();
        schedule.wait_for(|s| s.enabled).await.unwrap();

        let keys: Vec<String> = sync
            .schedule()
            .scheduled_devices
            .keys()
            .map(ToString::to_string)
            .collect();
        assert_eq!(keys, ["relay1"]);
    }

    #[tokio::test]
    async fn several_fields_change_in_one_update() {
        let store = Arc::new(MemoryStore::new());
        let sync = start(&store);
        let updates = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&updates);
        sync.on_schedule_changed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.seed(
            &store_path("schedule"),
            json!({"enabled": true, "onTime": "8:00 PM", "offTime": "7:00 AM", "relay3": true}),
        );
        let mut schedule = sync.watch_schedule();
        schedule.wait_for(|s| s.enabled).await.unwrap();
        settle().await;

        assert_eq!(updates.load(Ordering::SeqCst), 1);
        let current = sync.schedule();
        assert_eq!(current.on_time_raw, "8:00 PM");
        assert_eq!(current.off_time_raw, "7:00 AM");
        assert!(current.is_scheduled("relay3"));
    }
}

// ============================================================================
// Failures and lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn subscription_failure_keeps_data_and_reports_status() {
        let store = Arc::new(MemoryStore::with_data(json!({"relay": {"relay1": true}})));
        let sync = start(&store);
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&failures);
        sync.on_status_changed(move |kind, status| {
            if kind == ProjectorKind::Relays && status.is_failed() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let mut relays = sync.watch_relays();
        relays.wait_for(|r| r.is_on("relay1")).await.unwrap();

        store.fail(&store_path("relay"), "permission denied");
        let mut status = sync.watch_relay_status();
        status.wait_for(ProjectorStatus::is_failed).await.unwrap();

        assert_eq!(sync.relays().get("relay1"), Some(true));
        assert_eq!(failures.load(Ordering::SeqCst), 1);
        // The schedule path was not affected.
        assert!(!sync.schedule_status().is_failed());
    }

    #[tokio::test]
    async fn nothing_is_observed_after_shutdown() {
        let store = Arc::new(MemoryStore::with_data(json!({"relay": {"relay1": true}})));
        let sync = start(&store);
        let mut relays = sync.watch_relays();
        relays.wait_for(|r| r.is_on("relay1")).await.unwrap();

        let callbacks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&callbacks);
        sync.on_relays_changed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sync.shutdown();
        relays.mark_unchanged();

        store.seed(&store_path("relay/relay1"), json!(false));
        store.seed(&store_path("relay/relay2"), json!(true));
        settle().await;

        assert!(!relays.has_changed().unwrap_or(false));
        assert_eq!(sync.relays().get("relay1"), Some(true));
        assert_eq!(callbacks.load(Ordering::SeqCst), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_waits_for_a_running_callback() {
        let store = Arc::new(MemoryStore::with_data(json!({"relay": {"relay1": true}})));
        let sync = start(&store);
        let mut relays = sync.watch_relays();
        relays.wait_for(|r| r.is_on("relay1")).await.unwrap();

        let entered = Arc::new(tokio::sync::Notify::new());
        let finished = Arc::new(AtomicBool::new(false));
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let (entered, finished, calls) =
                (Arc::clone(&entered), Arc::clone(&finished), Arc::clone(&calls));
            sync.on_relays_changed(move |_| {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    entered.notify_one();
                    std::thread::sleep(Duration::from_millis(100));
                    finished.store(true, Ordering::SeqCst);
                }
            });
        }

        store.seed(&store_path("relay/relay1"), json!(false));
        entered.notified().await;
        sync.shutdown();

        // The callback already running completed before shutdown returned.
        assert!(finished.load(Ordering::SeqCst));

        store.seed(&store_path("relay/relay1"), json!(true));
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn writes_still_work_after_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let sync = start(&store);
        sync.shutdown();

        sync.dispatcher().set_relay(&key("relay1"), true).unwrap();
        assert_eq!(writes(&store), [("relay/relay1".to_string(), json!(true))]);
        assert!(sync.relays().is_empty());
    }

    #[tokio::test]
    async fn sign_out_tears_down_and_signs_out() {
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(LocalIdentity::signed_in());
        let sync = SyncSession::start(
            Arc::clone(&store),
            Session::new(Arc::clone(&identity)),
            SyncConfig::default(),
        )
        .unwrap();

        sync.sign_out();
        settle().await;

        assert!(!sync.session().is_signed_in());
        assert!(sync.is_shut_down());
        assert_eq!(store.subscriber_count(), 0);
    }
}
