// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn schema_init_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    init_schema(&db.conn).unwrap();
    init_schema(&db.conn).unwrap();
}

#[test]
fn reopening_keeps_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outbox.db");
    {
        let db = Database::open(&path).unwrap();
        db.conn
            .execute(
                "INSERT INTO local_items (temp_id, endpoint, method, payload, created_at)
                 VALUES ('temp_1_abc', '/api/users', 'POST', '{}', '2026-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let count: i64 = db
        .conn
        .query_row("SELECT COUNT(*) FROM local_items", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn open_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state").join("outbox.db");

    Database::open(&path).unwrap();
    assert!(path.exists());
}
