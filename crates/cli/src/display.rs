// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use outbox_core::{LocalDataItem, QueueItem};

use crate::sync::{DrainReport, SyncPhase, SyncStatus};

/// Longest payload preview shown on a single line.
const PREVIEW_WIDTH: usize = 60;

/// Shorten `text` to `width` characters, marking the cut with `...`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// One line per queued write: `3  failed     POST   /api/users  (retries: 2)`.
pub fn format_item_line(item: &QueueItem) -> String {
    let mut line = format!(
        "{:>4}  {:<9}  {:<6}  {}",
        item.id,
        item.status.as_str(),
        item.method.as_str(),
        item.endpoint
    );
    if item.retries > 0 {
        line.push_str(&format!("  (retries: {})", item.retries));
    }
    line
}

/// One line per staged entity with a compact payload preview.
pub fn format_staged_line(item: &LocalDataItem) -> String {
    let mut entity = item.payload.clone();
    if let Some(object) = entity.as_object_mut() {
        object.remove("id");
        object.remove(outbox_core::local::TEMP_ID_FIELD);
        object.remove(outbox_core::local::PENDING_FIELD);
    }
    format!(
        "{}  {}  {}",
        item.temp_id,
        item.endpoint,
        truncate(&entity.to_string(), PREVIEW_WIDTH)
    )
}

pub fn format_report(report: &DrainReport) -> String {
    if report.attempted() == 0 {
        return "nothing to drain".to_string();
    }
    let mut line = format!(
        "drained {} write(s): {} succeeded, {} failed",
        report.attempted(),
        report.succeeded,
        report.failed
    );
    if report.abandoned > 0 {
        line.push_str(&format!(", {} abandoned", report.abandoned));
    }
    line
}

pub fn phase_label(phase: SyncPhase) -> &'static str {
    match phase {
        SyncPhase::Idle => "idle",
        SyncPhase::Pending => "pending",
        SyncPhase::Syncing => "syncing",
        SyncPhase::Succeeded => "synced",
        SyncPhase::Partial => "partially synced",
        SyncPhase::Failed => "sync failed",
    }
}

pub fn format_status(status: &SyncStatus) -> String {
    let connectivity = if status.online { "online" } else { "offline" };
    let mut line = format!(
        "[{}] {}, {} pending",
        connectivity,
        phase_label(status.phase),
        status.pending
    );
    if let Some(error) = &status.last_error {
        line.push_str(&format!(" ({})", error));
    }
    line
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
