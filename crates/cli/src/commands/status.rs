// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::{OfflineSession, Transport};

use super::{print_json, Context};

/// JSON output structure for the status command.
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct StatusJson {
    /// Writes the next drain will replay.
    pub pending: usize,
    pub statuses: BTreeMap<String, usize>,
    pub staged: usize,
}

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let session = ctx.open_session(false)?;
    run_impl(&session, output)
}

pub(crate) fn collect<T: Transport + 'static>(session: &OfflineSession<T>) -> Result<StatusJson> {
    Ok(StatusJson {
        pending: session.queue().pending_count()?,
        statuses: session.queue().stats()?,
        staged: session.merger().staged_count()?,
    })
}

pub(crate) fn run_impl<T: Transport + 'static>(
    session: &OfflineSession<T>,
    output: OutputFormat,
) -> Result<()> {
    let status = collect(session)?;
    match output {
        OutputFormat::Json => print_json(&status)?,
        OutputFormat::Text => {
            println!("pending: {}", status.pending);
            for (name, count) in &status.statuses {
                println!("  {:<10} {}", name, count);
            }
            println!("staged: {}", status.staged);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
