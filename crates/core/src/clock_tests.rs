// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_reads_real_time() {
    // 2024-01-01T00:00:00Z
    assert!(SystemClock.epoch_ms() > 1_704_067_200_000);
}

#[test]
fn clones_see_the_same_advance() {
    let clock = FakeClock::default();
    assert_eq!(clock.epoch_ms(), FAKE_EPOCH_MS);

    let handle = clock.clone();
    handle.advance(Duration::from_millis(2_500));
    handle.advance(Duration::from_secs(1));
    assert_eq!(clock.epoch_ms(), FAKE_EPOCH_MS + 3_500);
}
