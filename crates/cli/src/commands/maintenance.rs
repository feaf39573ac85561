// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use outbox_core::{ItemId, QueueItem};

use crate::error::Result;
use crate::sync::{OfflineSession, Transport};

use super::Context;

pub fn retry(ctx: &Context, id: &str) -> Result<()> {
    let session = ctx.open_session(false)?;
    retry_impl(&session, id)?;
    Ok(())
}

pub(crate) fn retry_impl<T: Transport + 'static>(
    session: &OfflineSession<T>,
    id: &str,
) -> Result<QueueItem> {
    let id: ItemId = id.parse()?;
    let item = session.queue().retry(id)?;
    println!("{} is pending again (retries so far: {})", item.id, item.retries);
    Ok(item)
}

pub fn clear_completed(ctx: &Context) -> Result<()> {
    let session = ctx.open_session(false)?;
    clear_completed_impl(&session)?;
    Ok(())
}

pub(crate) fn clear_completed_impl<T: Transport + 'static>(
    session: &OfflineSession<T>,
) -> Result<usize> {
    let removed = session.queue().clear_completed()?;
    println!("removed {} completed write(s)", removed);
    Ok(removed)
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
