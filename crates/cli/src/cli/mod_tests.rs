// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use clap::CommandFactory;
use yare::parameterized;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("outbox").chain(args.iter().copied()))
}

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn enqueue_collects_repeated_headers() {
    let cli = parse(&[
        "enqueue",
        "POST",
        "/api/users",
        "--data",
        r#"{"name":"Ana"}"#,
        "-H",
        "a:1",
        "--header",
        "b:2",
    ])
    .unwrap();
    match cli.command {
        Command::Enqueue {
            method,
            endpoint,
            data,
            headers,
            output,
        } => {
            assert_eq!(method, "POST");
            assert_eq!(endpoint, "/api/users");
            assert_eq!(data.as_deref(), Some(r#"{"name":"Ana"}"#));
            assert_eq!(headers, vec!["a:1", "b:2"]);
            assert_eq!(output, OutputFormat::Text);
        }
        _ => panic!("expected enqueue"),
    }
}

#[test]
fn enqueue_rejects_blank_endpoint() {
    assert!(parse(&["enqueue", "POST", "  "]).is_err());
}

#[test]
fn global_flags_after_subcommand() {
    let cli = parse(&["status", "--db", "/tmp/x.db", "--server", "http://h"]).unwrap();
    assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
    assert_eq!(cli.server.as_deref(), Some("http://h"));
}

#[parameterized(
    text = { "text", OutputFormat::Text },
    json = { "json", OutputFormat::Json },
)]
fn list_output_format(value: &str, expected: OutputFormat) {
    let cli = parse(&["list", "-o", value, "-s", "failed"]).unwrap();
    match cli.command {
        Command::List { status, output } => {
            assert_eq!(status.as_deref(), Some("failed"));
            assert_eq!(output, expected);
        }
        _ => panic!("expected list"),
    }
}

#[test]
fn clear_completed_is_kebab_case() {
    assert!(matches!(
        parse(&["clear-completed"]).unwrap().command,
        Command::ClearCompleted
    ));
}

#[test]
fn retry_requires_id() {
    assert!(parse(&["retry"]).is_err());
}
