// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running replay loop.
//!
//! Probes the server's health endpoint to drive the connectivity signal,
//! serves in-process wake requests, and prints every status change until
//! interrupted with Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cli::OutputFormat;
use crate::display::format_status;
use crate::error::Result;
use crate::sync::{
    LocalWakeScheduler, OfflineSession, Request, SyncEvent, SyncObserver, Transport,
};

use super::Context;

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch(ctx, output))
}

async fn watch(ctx: &Context, output: OutputFormat) -> Result<()> {
    let (scheduler, wakes) = LocalWakeScheduler::new();
    let session = Arc::new(
        ctx.session_builder()
            .online(false)
            .recover_interrupted(true)
            .scheduler(Arc::new(scheduler))
            .open(&ctx.db_path)?,
    );
    let observer = SyncObserver::new(session.clone(), ctx.config.observer.clone());
    let cancel = CancellationToken::new();

    let reloads = session.events().subscribe(|event| {
        if matches!(event, SyncEvent::ReloadRequested) {
            tracing::info!("server data changed, reload requested");
        }
    });

    let printer = {
        let mut status_rx = observer.subscribe();
        tokio::spawn(async move {
            loop {
                let status = status_rx.borrow_and_update().clone();
                print_status(&status, output);
                if status_rx.changed().await.is_err() {
                    break;
                }
            }
        })
    };

    let probe = tokio::spawn(probe_connectivity(
        session.clone(),
        ctx.config.observer.health_endpoint.clone(),
        ctx.config.observer.poll_interval(),
        cancel.clone(),
    ));

    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted, shutting down");
            }
            cancel.cancel();
        })
    };

    session.coordinator().register_general_sync().await;
    let result = observer.run(cancel.clone(), Some(wakes)).await;

    cancel.cancel();
    interrupt.abort();
    let _ = probe.await;
    printer.abort();
    session.events().unsubscribe(reloads);
    result
}

fn print_status(status: &crate::sync::SyncStatus, output: OutputFormat) {
    match output {
        OutputFormat::Text => println!("{}", format_status(status)),
        OutputFormat::Json => match serde_json::to_string(status) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!(error = %e, "could not encode status"),
        },
    }
}

/// Flip the connectivity signal from health probes until cancelled.
///
/// Any HTTP answer counts as reachable; only transport errors count as
/// offline.
pub(crate) async fn probe_connectivity<T: Transport + 'static>(
    session: Arc<OfflineSession<T>>,
    health_endpoint: String,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let reachable = session
                    .transport()
                    .send(Request::get(health_endpoint.as_str()))
                    .await
                    .is_ok();
                session.set_online(reachable);
            }
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
