// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use outbox_core::{QueueItem, QueueStatus};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::display::format_item_line;
use crate::error::Result;
use crate::sync::{OfflineSession, Transport};

use super::{print_json, Context};

/// JSON output structure for the list command.
#[derive(Serialize)]
struct ListOutputJson<'a> {
    items: &'a [QueueItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<QueueStatus>,
}

pub fn run(ctx: &Context, status: Option<String>, output: OutputFormat) -> Result<()> {
    let session = ctx.open_session(false)?;
    run_impl(&session, status.as_deref(), output)
}

pub(crate) fn run_impl<T: Transport + 'static>(
    session: &OfflineSession<T>,
    status: Option<&str>,
    output: OutputFormat,
) -> Result<()> {
    let status = status.map(str::parse::<QueueStatus>).transpose()?;
    let items = session.queue().items(status)?;

    match output {
        OutputFormat::Json => print_json(&ListOutputJson {
            items: &items,
            status,
        })?,
        OutputFormat::Text => {
            if items.is_empty() {
                println!("no queued writes");
            }
            for item in &items {
                println!("{}", format_item_line(item));
                if let Some(error) = &item.last_error {
                    println!("        last error: {}", error);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
