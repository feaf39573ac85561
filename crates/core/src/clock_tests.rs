// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn manual_clock_advances() {
    let clock = ManualClock::new(1_000);
    assert_eq!(clock.now_ms(), 1_000);

    clock.advance(Duration::from_secs(2));
    assert_eq!(clock.now_ms(), 3_000);

    clock.set(10);
    assert_eq!(clock.now_ms(), 10);
}

#[test]
fn now_utc_matches_millis() {
    let clock = ManualClock::new(1_700_000_000_123);
    assert_eq!(clock.now_utc().timestamp_millis(), 1_700_000_000_123);
}

#[test]
fn system_clock_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now_ms() > 1_577_836_800_000);
}

#[test]
fn arc_clock_delegates() {
    let clock = std::sync::Arc::new(ManualClock::new(5));
    let shared: std::sync::Arc<dyn ClockSource> = clock.clone();
    clock.advance(Duration::from_millis(5));
    assert_eq!(shared.now_ms(), 10);
}
