// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::item::Method;
use chrono::Utc;
use serde_json::json;

fn new_write(endpoint: &str, method: Method) -> NewQueueItem {
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    NewQueueItem::new(
        endpoint,
        method,
        Some(json!({"name": "X"})),
        headers,
        Utc::now(),
    )
    .unwrap()
}

#[test]
fn insert_and_get_queue_item() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_queue_item(&new_write("/api/users", Method::Post).with_temp_id("temp_1_a"))
        .unwrap();

    let item = db.get_queue_item(id).unwrap();
    assert_eq!(item.endpoint, "/api/users");
    assert_eq!(item.method, Method::Post);
    assert_eq!(item.payload, Some(json!({"name": "X"})));
    assert_eq!(item.headers["content-type"], "application/json");
    assert_eq!(item.status, QueueStatus::Pending);
    assert_eq!(item.retries, 0);
    assert_eq!(item.temp_id.as_deref(), Some("temp_1_a"));
    assert!(item.last_error.is_none());
}

#[test]
fn ids_increase_with_insertion() {
    let db = Database::open_in_memory().unwrap();
    let a = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    let b = db.insert_queue_item(&new_write("/api/b", Method::Put)).unwrap();
    let c = db.insert_queue_item(&new_write("/api/a", Method::Delete)).unwrap();
    assert!(a < b && b < c);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let db = Database::open_in_memory().unwrap();
    let a = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    db.delete_queue_item(a).unwrap();
    let b = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    assert!(b > a);
}

#[test]
fn bodiless_write_round_trips() {
    let db = Database::open_in_memory().unwrap();
    let write = NewQueueItem::new(
        "/api/tasks/7",
        Method::Delete,
        None,
        BTreeMap::new(),
        Utc::now(),
    )
    .unwrap();
    let id = db.insert_queue_item(&write).unwrap();
    let item = db.get_queue_item(id).unwrap();
    assert!(item.payload.is_none());
    assert!(item.headers.is_empty());
}

#[test]
fn get_missing_item() {
    let db = Database::open_in_memory().unwrap();
    let err = db.get_queue_item(ItemId(404)).unwrap_err();
    assert!(matches!(err, Error::ItemNotFound(404)));
}

#[test]
fn drainable_items_include_failed_in_creation_order() {
    let mut db = Database::open_in_memory().unwrap();
    let a = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    let b = db.insert_queue_item(&new_write("/api/b", Method::Post)).unwrap();
    let c = db.insert_queue_item(&new_write("/api/c", Method::Post)).unwrap();

    db.set_queue_status(a, QueueStatus::Syncing).unwrap();
    db.record_queue_failure(a, "HTTP 500", None).unwrap();
    db.set_queue_status(b, QueueStatus::Syncing).unwrap();

    let ids: Vec<ItemId> = db
        .list_drainable_items()
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ids, vec![a, c]);
    assert_eq!(db.count_drainable_items().unwrap(), 2);
}

#[test]
fn list_filters_by_status() {
    let mut db = Database::open_in_memory().unwrap();
    let a = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    db.insert_queue_item(&new_write("/api/b", Method::Post)).unwrap();
    db.set_queue_status(a, QueueStatus::Syncing).unwrap();

    assert_eq!(db.list_queue_items(None).unwrap().len(), 2);
    let syncing = db.list_queue_items(Some(QueueStatus::Syncing)).unwrap();
    assert_eq!(syncing.len(), 1);
    assert_eq!(syncing[0].id, a);
}

#[test]
fn set_status_rejects_backwards_transition() {
    let mut db = Database::open_in_memory().unwrap();
    let id = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    db.set_queue_status(id, QueueStatus::Syncing).unwrap();
    db.set_queue_status(id, QueueStatus::Completed).unwrap();

    let err = db.set_queue_status(id, QueueStatus::Pending).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
    assert_eq!(db.get_queue_item(id).unwrap().status, QueueStatus::Completed);
}

#[test]
fn record_failure_increments_retries() {
    let mut db = Database::open_in_memory().unwrap();
    let id = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();

    for attempt in 1..=3 {
        db.set_queue_status(id, QueueStatus::Syncing).unwrap();
        let item = db.record_queue_failure(id, "HTTP 503", None).unwrap();
        assert_eq!(item.retries, attempt);
        assert_eq!(item.status, QueueStatus::Failed);
    }

    let stored = db.get_queue_item(id).unwrap();
    assert_eq!(stored.retries, 3);
    assert_eq!(stored.last_error.as_deref(), Some("HTTP 503"));
}

#[test]
fn record_failure_abandons_at_ceiling() {
    let mut db = Database::open_in_memory().unwrap();
    let id = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();

    db.set_queue_status(id, QueueStatus::Syncing).unwrap();
    assert_eq!(
        db.record_queue_failure(id, "boom", Some(2)).unwrap().status,
        QueueStatus::Failed
    );
    db.set_queue_status(id, QueueStatus::Syncing).unwrap();
    assert_eq!(
        db.record_queue_failure(id, "boom", Some(2)).unwrap().status,
        QueueStatus::Abandoned
    );
    assert_eq!(db.count_drainable_items().unwrap(), 0);
}

#[test]
fn record_failure_requires_syncing() {
    let mut db = Database::open_in_memory().unwrap();
    let id = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    let err = db.record_queue_failure(id, "boom", None).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
    assert_eq!(db.get_queue_item(id).unwrap().retries, 0);
}

#[test]
fn delete_by_status() {
    let mut db = Database::open_in_memory().unwrap();
    let a = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    let b = db.insert_queue_item(&new_write("/api/b", Method::Post)).unwrap();
    db.set_queue_status(a, QueueStatus::Syncing).unwrap();
    db.set_queue_status(a, QueueStatus::Completed).unwrap();

    assert_eq!(
        db.delete_queue_items_with_status(QueueStatus::Completed)
            .unwrap(),
        1
    );
    let remaining = db.list_queue_items(None).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b);
}

#[test]
fn reset_syncing_items() {
    let mut db = Database::open_in_memory().unwrap();
    let a = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    db.insert_queue_item(&new_write("/api/b", Method::Post)).unwrap();
    db.set_queue_status(a, QueueStatus::Syncing).unwrap();

    assert_eq!(db.reset_syncing_items().unwrap(), 1);
    assert_eq!(db.get_queue_item(a).unwrap().status, QueueStatus::Pending);
}

#[test]
fn counts_by_status_include_zeroes() {
    let mut db = Database::open_in_memory().unwrap();
    let a = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    db.insert_queue_item(&new_write("/api/b", Method::Post)).unwrap();
    db.set_queue_status(a, QueueStatus::Syncing).unwrap();

    let counts = db.count_queue_items_by_status().unwrap();
    assert_eq!(counts["pending"], 1);
    assert_eq!(counts["syncing"], 1);
    assert_eq!(counts["failed"], 0);
    assert_eq!(counts["abandoned"], 0);
}

#[test]
fn corrupted_status_is_reported() {
    let db = Database::open_in_memory().unwrap();
    let id = db.insert_queue_item(&new_write("/api/a", Method::Post)).unwrap();
    db.conn
        .execute(
            "UPDATE queue_items SET status = 'bogus' WHERE id = ?1",
            params![id.0],
        )
        .unwrap();

    assert!(db.get_queue_item(id).is_err());
}
