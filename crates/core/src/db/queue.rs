// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued write storage.

use rusqlite::{params, OptionalExtension, Row};
use std::collections::BTreeMap;

use super::{parse_db, parse_json, parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::item::{ItemId, NewQueueItem, QueueItem, QueueStatus};

const SELECT_COLUMNS: &str = "SELECT id, endpoint, method, payload, headers, created_at,
        status, retries, last_error, temp_id
 FROM queue_items";

fn row_to_queue_item(row: &Row) -> std::result::Result<QueueItem, rusqlite::Error> {
    let method_str: String = row.get(2)?;
    let payload_str: Option<String> = row.get(3)?;
    let headers_str: String = row.get(4)?;
    let created_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let retries: i64 = row.get(7)?;

    Ok(QueueItem {
        id: ItemId(row.get(0)?),
        endpoint: row.get(1)?,
        method: parse_db(&method_str, "method")?,
        payload: payload_str
            .map(|p| parse_json(&p, "payload"))
            .transpose()?,
        headers: parse_json::<BTreeMap<String, String>>(&headers_str, "headers")?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        status: parse_db(&status_str, "status")?,
        retries: u32::try_from(retries).unwrap_or(u32::MAX),
        last_error: row.get(8)?,
        temp_id: row.get(9)?,
    })
}

impl Database {
    /// Append a write to the queue and return its id.
    pub fn insert_queue_item(&self, item: &NewQueueItem) -> Result<ItemId> {
        let payload = item
            .payload
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let headers = serde_json::to_string(&item.headers)?;

        self.conn.execute(
            "INSERT INTO queue_items (endpoint, method, payload, headers, created_at,
             status, retries, temp_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                item.endpoint,
                item.method.as_str(),
                payload,
                headers,
                item.created_at.to_rfc3339(),
                QueueStatus::Pending.as_str(),
                item.temp_id,
            ],
        )?;
        Ok(ItemId(self.conn.last_insert_rowid()))
    }

    /// Get a queued write by id.
    pub fn get_queue_item(&self, id: ItemId) -> Result<QueueItem> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let item = self
            .conn
            .query_row(&sql, params![id.0], row_to_queue_item)
            .optional()?;

        item.ok_or(Error::ItemNotFound(id.0))
    }

    /// List queued writes in creation order, optionally filtered by status.
    pub fn list_queue_items(&self, status: Option<QueueStatus>) -> Result<Vec<QueueItem>> {
        let items = match status {
            Some(status) => {
                let sql = format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY id");
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![status.as_str()], row_to_queue_item)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!("{SELECT_COLUMNS} ORDER BY id");
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map([], row_to_queue_item)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(items)
    }

    /// List writes the next drain should replay, in creation order.
    pub fn list_drainable_items(&self) -> Result<Vec<QueueItem>> {
        let sql = format!("{SELECT_COLUMNS} WHERE status IN ('pending', 'failed') ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_queue_item)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Count writes the next drain should replay.
    pub fn count_drainable_items(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM queue_items WHERE status IN ('pending', 'failed')",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Count queued writes per status. Statuses with no items are included with 0.
    pub fn count_queue_items_by_status(&self) -> Result<BTreeMap<String, usize>> {
        let mut counts: BTreeMap<String, usize> = QueueStatus::all()
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM queue_items GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count as usize))
        })?;
        for row in rows {
            let (status, count) = row?;
            counts.insert(status, count);
        }
        Ok(counts)
    }

    /// Move a queued write to a new status, enforcing the lifecycle.
    pub fn set_queue_status(&mut self, id: ItemId, status: QueueStatus) -> Result<()> {
        let tx = self.conn.transaction()?;
        let current: Option<String> = tx
            .query_row(
                "SELECT status FROM queue_items WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?;
        let current: QueueStatus = current.ok_or(Error::ItemNotFound(id.0))?.parse()?;

        if !current.can_transition_to(status) {
            return Err(Error::InvalidTransition {
                from: current.to_string(),
                to: status.to_string(),
            });
        }

        tx.execute(
            "UPDATE queue_items SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.0],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Record a failed replay of a syncing write.
    ///
    /// Increments the retry count and stores the error. The write becomes
    /// `failed`, or `abandoned` once the retry count reaches `max_retries`.
    pub fn record_queue_failure(
        &mut self,
        id: ItemId,
        error: &str,
        max_retries: Option<u32>,
    ) -> Result<QueueItem> {
        let tx = self.conn.transaction()?;
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let item = tx
            .query_row(&sql, params![id.0], row_to_queue_item)
            .optional()?
            .ok_or(Error::ItemNotFound(id.0))?;

        let retries = item.retries.saturating_add(1);
        let status = match max_retries {
            Some(max) if retries >= max => QueueStatus::Abandoned,
            _ => QueueStatus::Failed,
        };
        if !item.status.can_transition_to(status) {
            return Err(Error::InvalidTransition {
                from: item.status.to_string(),
                to: status.to_string(),
            });
        }

        tx.execute(
            "UPDATE queue_items SET status = ?1, retries = ?2, last_error = ?3 WHERE id = ?4",
            params![status.as_str(), retries, error, id.0],
        )?;
        tx.commit()?;

        Ok(QueueItem {
            status,
            retries,
            last_error: Some(error.to_string()),
            ..item
        })
    }

    /// Delete a queued write. Returns false if it did not exist.
    pub fn delete_queue_item(&self, id: ItemId) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM queue_items WHERE id = ?1", params![id.0])?;
        Ok(affected > 0)
    }

    /// Delete every queued write in the given status.
    pub fn delete_queue_items_with_status(&self, status: QueueStatus) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM queue_items WHERE status = ?1",
            params![status.as_str()],
        )?;
        Ok(affected)
    }

    /// Put writes stranded in `syncing` back to `pending`.
    pub fn reset_syncing_items(&self) -> Result<usize> {
        let affected = self.conn.execute(
            "UPDATE queue_items SET status = 'pending' WHERE status = 'syncing'",
            [],
        )?;
        Ok(affected)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
