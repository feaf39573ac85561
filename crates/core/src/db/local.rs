// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Staged optimistic entity storage.

use rusqlite::{params, Row};

use super::{parse_db, parse_json, parse_timestamp, Database};
use crate::error::Result;
use crate::local::LocalDataItem;

fn row_to_local_item(row: &Row) -> std::result::Result<LocalDataItem, rusqlite::Error> {
    let method_str: String = row.get(2)?;
    let payload_str: String = row.get(3)?;
    let created_str: String = row.get(4)?;

    Ok(LocalDataItem {
        temp_id: row.get(0)?,
        endpoint: row.get(1)?,
        method: parse_db(&method_str, "method")?,
        payload: parse_json(&payload_str, "payload")?,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

impl Database {
    /// Store a staged entity.
    pub fn insert_local_item(&self, item: &LocalDataItem) -> Result<()> {
        self.conn.execute(
            "INSERT INTO local_items (temp_id, endpoint, method, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                item.temp_id,
                item.endpoint,
                item.method.as_str(),
                serde_json::to_string(&item.payload)?,
                item.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List staged entities in creation order, optionally for one endpoint only.
    pub fn list_local_items(&self, endpoint: Option<&str>) -> Result<Vec<LocalDataItem>> {
        let items = match endpoint {
            Some(endpoint) => {
                let mut stmt = self.conn.prepare(
                    "SELECT temp_id, endpoint, method, payload, created_at
                     FROM local_items WHERE endpoint = ?1 ORDER BY rowid",
                )?;
                let rows = stmt.query_map(params![endpoint], row_to_local_item)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT temp_id, endpoint, method, payload, created_at
                     FROM local_items ORDER BY rowid",
                )?;
                let rows = stmt.query_map([], row_to_local_item)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(items)
    }

    /// Count staged entities.
    pub fn count_local_items(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM local_items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Delete one staged entity. Returns false if it did not exist.
    pub fn delete_local_item(&self, temp_id: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM local_items WHERE temp_id = ?1", params![temp_id])?;
        Ok(affected > 0)
    }

    /// Delete every staged entity.
    pub fn clear_local_items(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM local_items", [])?;
        Ok(affected)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
