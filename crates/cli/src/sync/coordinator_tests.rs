// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for background sync registration.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use outbox_core::{ClockSource, ManualClock, RegistrationStatus};

use super::coordinator::*;
use super::events::{EventBus, SyncEvent};
use super::test_helpers::{record_events, test_clock, MockScheduler};
use crate::config::BackgroundSettings;

fn coordinator(
    scheduler: Arc<MockScheduler>,
    clock: Arc<ManualClock>,
    events: Arc<EventBus>,
) -> BackgroundSyncCoordinator {
    BackgroundSyncCoordinator::new(scheduler, clock, events, BackgroundSettings::default())
}

fn setup() -> (BackgroundSyncCoordinator, Arc<MockScheduler>, Arc<ManualClock>) {
    let scheduler = Arc::new(MockScheduler::new());
    let clock = test_clock();
    let coordinator = coordinator(scheduler.clone(), clock.clone(), Arc::new(EventBus::new()));
    (coordinator, scheduler, clock)
}

#[tokio::test]
async fn cooldown_suppresses_second_registration() {
    let (coordinator, scheduler, clock) = setup();
    let interval = Duration::from_secs(60);

    assert!(coordinator.register_sync("sync-users", interval).await);
    clock.advance(Duration::from_secs(59));
    assert!(!coordinator.register_sync("sync-users", interval).await);
    assert_eq!(scheduler.registered(), vec!["sync-users"]);

    clock.advance(Duration::from_secs(1));
    assert!(coordinator.register_sync("sync-users", interval).await);
    assert_eq!(scheduler.registered(), vec!["sync-users", "sync-users"]);
}

#[tokio::test]
async fn cooldown_is_per_tag() {
    let (coordinator, scheduler, _clock) = setup();
    assert!(coordinator.register_type_sync("users").await);
    assert!(coordinator.register_type_sync("tasks").await);
    assert!(!coordinator.register_type_sync("users").await);
    assert_eq!(scheduler.registered(), vec!["sync-users", "sync-tasks"]);
}

#[tokio::test]
async fn concurrent_registrations_reach_host_once() {
    let (coordinator, scheduler, _clock) = setup();
    let interval = Duration::from_secs(300);

    let (a, b) = tokio::join!(
        coordinator.register_sync(GENERAL_SYNC_TAG, interval),
        coordinator.register_sync(GENERAL_SYNC_TAG, interval),
    );

    assert!(a ^ b);
    assert_eq!(scheduler.registered().len(), 1);
}

#[tokio::test]
async fn general_sync_uses_configured_cooldown() {
    let (coordinator, scheduler, clock) = setup();
    assert!(coordinator.register_general_sync().await);
    clock.advance(Duration::from_secs(299));
    assert!(!coordinator.register_general_sync().await);
    clock.advance(Duration::from_secs(1));
    assert!(coordinator.register_general_sync().await);
    assert_eq!(scheduler.registered().len(), 2);
}

#[tokio::test]
async fn unsupported_host_registers_nothing() {
    let scheduler = Arc::new(MockScheduler::unavailable());
    let coordinator = coordinator(scheduler.clone(), test_clock(), Arc::new(EventBus::new()));

    assert!(!coordinator.is_supported());
    assert!(!coordinator.register_general_sync().await);
    assert_eq!(coordinator.force_sync().await, 0);
    assert!(coordinator.registrations().is_empty());
}

#[tokio::test]
async fn unsupported_scheduler_is_never_available() {
    let scheduler = UnsupportedScheduler;
    assert!(!scheduler.is_available());
    assert!(scheduler.register("background-sync").await.is_err());
}

#[tokio::test]
async fn rejected_registration_leaves_no_cooldown() {
    let (coordinator, scheduler, _clock) = setup();
    scheduler.set_reject(true);
    assert!(!coordinator.register_type_sync("users").await);
    assert!(coordinator.registrations().is_empty());

    scheduler.set_reject(false);
    assert!(coordinator.register_type_sync("users").await);
}

#[tokio::test]
async fn force_sync_bypasses_cooldown() {
    let (coordinator, scheduler, _clock) = setup();
    assert!(coordinator.register_general_sync().await);

    assert_eq!(coordinator.force_sync().await, 4);

    assert_eq!(
        scheduler.registered(),
        vec![
            "background-sync",
            "background-sync",
            "sync-users",
            "sync-tasks",
            "sync-calendar",
        ]
    );
    let tags: Vec<_> = coordinator
        .registrations()
        .into_iter()
        .map(|r| r.tag)
        .collect();
    assert_eq!(
        tags,
        vec!["background-sync", "sync-calendar", "sync-tasks", "sync-users"]
    );
}

#[tokio::test]
async fn registrations_are_marked_registered() {
    let (coordinator, _scheduler, clock) = setup();
    coordinator.register_type_sync("users").await;
    let registration = &coordinator.registrations()[0];
    assert_eq!(registration.status, RegistrationStatus::Registered);
    assert_eq!(registration.registered_at_ms, clock.now_ms());
}

#[tokio::test]
async fn handle_wake_completed_updates_and_publishes() {
    let bus = Arc::new(EventBus::new());
    let events = record_events(&bus);
    let scheduler = Arc::new(MockScheduler::new());
    let coordinator = coordinator(scheduler, test_clock(), bus);
    coordinator.register_type_sync("users").await;

    coordinator.handle_wake(WakeSignal::Completed {
        succeeded: 2,
        failed: 1,
        total: 3,
    });

    assert_eq!(
        coordinator.registrations()[0].status,
        RegistrationStatus::Completed
    );
    assert_eq!(
        events.lock().unwrap().clone(),
        vec![SyncEvent::BackgroundSyncCompleted {
            succeeded: 2,
            failed: 1,
            total: 3
        }]
    );
}

#[tokio::test]
async fn handle_wake_failed_counts_retries() {
    let bus = Arc::new(EventBus::new());
    let events = record_events(&bus);
    let coordinator = coordinator(Arc::new(MockScheduler::new()), test_clock(), bus);
    coordinator.register_general_sync().await;

    coordinator.handle_wake(WakeSignal::Failed {
        error: "offline".into(),
    });
    coordinator.handle_wake(WakeSignal::Failed {
        error: "offline".into(),
    });

    let registration = &coordinator.registrations()[0];
    assert_eq!(registration.status, RegistrationStatus::Failed);
    assert_eq!(registration.retry_count, 2);
    assert_eq!(events.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn cleanup_drops_registrations_older_than_max_age() {
    let (coordinator, _scheduler, clock) = setup();
    coordinator.register_type_sync("users").await;
    clock.advance(Duration::from_secs(1800));
    coordinator.register_type_sync("tasks").await;

    clock.advance(Duration::from_secs(1801));
    assert_eq!(coordinator.cleanup_old_registrations(), 1);
    let tags: Vec<_> = coordinator
        .registrations()
        .into_iter()
        .map(|r| r.tag)
        .collect();
    assert_eq!(tags, vec!["sync-tasks"]);
}

#[tokio::test]
async fn local_scheduler_delivers_tags() {
    let (scheduler, mut rx) = LocalWakeScheduler::new();
    assert!(scheduler.is_available());
    scheduler.register("sync-users").await.unwrap();
    assert_eq!(rx.recv().await.as_deref(), Some("sync-users"));

    drop(rx);
    assert!(!scheduler.is_available());
    assert!(scheduler.register("sync-users").await.is_err());
}

#[test]
fn type_sync_tag_format() {
    assert_eq!(type_sync_tag("calendar"), "sync-calendar");
}
