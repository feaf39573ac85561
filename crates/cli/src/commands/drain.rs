// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::display::format_report;
use crate::error::Result;
use crate::sync::{DrainReport, OfflineSession, Transport};

use super::{print_json, Context};

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let session = ctx
        .session_builder()
        .recover_interrupted(true)
        .open(&ctx.db_path)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_impl(&session, output))?;
    Ok(())
}

pub(crate) async fn run_impl<T: Transport + 'static>(
    session: &OfflineSession<T>,
    output: OutputFormat,
) -> Result<DrainReport> {
    let report = session.sync().await?;
    match output {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => println!("{}", format_report(&report)),
    }
    Ok(report)
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
