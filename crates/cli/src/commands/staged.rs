// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::display::format_staged_line;
use crate::error::Result;
use crate::sync::{OfflineSession, Transport};

use super::{print_json, Context};

pub fn run(ctx: &Context, endpoint: Option<String>, output: OutputFormat) -> Result<()> {
    let session = ctx.open_session(false)?;
    run_impl(&session, endpoint.as_deref(), output)
}

pub(crate) fn run_impl<T: Transport + 'static>(
    session: &OfflineSession<T>,
    endpoint: Option<&str>,
    output: OutputFormat,
) -> Result<()> {
    match (output, endpoint) {
        // With an endpoint, show exactly what a merged listing would prepend.
        (OutputFormat::Json, Some(endpoint)) => {
            print_json(&session.merger().merge(endpoint, Vec::new()))?
        }
        (OutputFormat::Json, None) => print_json(&session.merger().staged(None)?)?,
        (OutputFormat::Text, _) => {
            let items = session.merger().staged(endpoint)?;
            if items.is_empty() {
                println!("no staged entities");
            }
            for item in &items {
                println!("{}", format_staged_line(item));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "staged_tests.rs"]
mod tests;
