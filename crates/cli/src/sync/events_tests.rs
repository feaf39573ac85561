// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::connectivity::Connectivity;
use super::events::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn subscribers_receive_published_events() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    bus.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    bus.publish(SyncEvent::QueueChanged { pending: 2 });
    bus.publish(SyncEvent::ReloadRequested);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![SyncEvent::QueueChanged { pending: 2 }, SyncEvent::ReloadRequested]
    );
}

#[test]
fn unsubscribe_stops_delivery() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    let id = bus.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    bus.publish(SyncEvent::ReloadRequested);
    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    bus.publish(SyncEvent::ReloadRequested);

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn callbacks_may_publish_reentrantly() {
    let bus = Arc::new(EventBus::new());
    let count = Arc::new(AtomicUsize::new(0));
    let inner_bus = bus.clone();
    let counter = count.clone();
    bus.subscribe(move |event| {
        counter.fetch_add(1, Ordering::SeqCst);
        if matches!(event, SyncEvent::SyncError { .. }) {
            inner_bus.publish(SyncEvent::ReloadRequested);
        }
    });

    bus.publish(SyncEvent::SyncError {
        message: "boom".into(),
    });
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn channel_forwards_events() {
    let bus = EventBus::new();
    let (_id, mut rx) = bus.channel();
    bus.publish(SyncEvent::Connectivity { online: true });
    assert_eq!(
        rx.recv().await,
        Some(SyncEvent::Connectivity { online: true })
    );
}

#[test]
fn events_serialize_with_type_tag() {
    let json = serde_json::to_value(SyncEvent::QueueChanged { pending: 3 }).unwrap();
    assert_eq!(json["type"], "queue_changed");
    assert_eq!(json["pending"], 3);
}

#[test]
fn connectivity_publishes_only_on_change() {
    let bus = Arc::new(EventBus::new());
    let (_id, mut rx) = bus.channel();
    let connectivity = Connectivity::new(true, bus.clone());

    assert!(!connectivity.set_online(true));
    assert!(connectivity.set_online(false));
    assert!(!connectivity.set_online(false));
    assert!(!connectivity.is_online());

    assert_eq!(
        rx.try_recv().unwrap(),
        SyncEvent::Connectivity { online: false }
    );
    assert!(rx.try_recv().is_err());
}
