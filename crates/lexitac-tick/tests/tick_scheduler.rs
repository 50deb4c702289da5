//! Integration tests for the tick scheduler.
//!
//! Uses `start_paused = true` so tokio's clock auto-advances: a sleep
//! resolves as soon as every task is idle, no real time passes.

use std::time::Duration;

use lexitac_tick::{TickConfig, TickScheduler};
use tokio_util::sync::CancellationToken;

// =========================================================================
// Helpers
// =========================================================================

fn ten_seconds() -> TickConfig {
    TickConfig::with_period(Duration::from_secs(10))
}

// =========================================================================
// Creation and accessors
// =========================================================================

#[test]
fn test_default_config_is_disabled() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.tick_period(), None);
}

#[tokio::test]
async fn test_scheduler_initial_state() {
    let s = TickScheduler::new(ten_seconds());
    assert_eq!(s.tick_count(), 0);
    assert!(!s.is_disabled());
    assert_eq!(s.period(), Some(Duration::from_secs(10)));
}

#[tokio::test]
async fn test_zero_period_scheduler_is_disabled() {
    let s = TickScheduler::with_period(Duration::ZERO);
    assert!(s.is_disabled());
    assert_eq!(s.period(), None);
}

// =========================================================================
// Tick firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_tick_fires_after_one_period() {
    let start = tokio::time::Instant::now();
    let mut s = TickScheduler::new(ten_seconds());

    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_increment_monotonically() {
    let mut s = TickScheduler::new(ten_seconds());

    for expected in 1..=4 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
    }
    assert_eq!(s.tick_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_scheduler_never_fires() {
    let mut s = TickScheduler::with_period(Duration::ZERO);

    let result = tokio::time::timeout(Duration::from_secs(3600), s.wait_for_tick()).await;
    assert!(result.is_err(), "disabled scheduler should pend forever");
}

#[tokio::test(start_paused = true)]
async fn test_late_wakeup_does_not_burst() {
    let mut s = TickScheduler::new(ten_seconds());

    // Nobody polls the scheduler for 35s; the overdue tick fires once.
    tokio::time::advance(Duration::from_secs(35)).await;
    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 1);

    // The next tick is one full period after the late wake-up.
    let before = tokio::time::Instant::now();
    s.wait_for_tick().await;
    assert_eq!(before.elapsed(), Duration::from_secs(10));
}

// =========================================================================
// Cancellation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_or_cancelled_returns_tick_when_not_cancelled() {
    let token = CancellationToken::new();
    let mut s = TickScheduler::new(ten_seconds());

    let info = s.wait_or_cancelled(&token).await;
    assert_eq!(info.map(|i| i.tick), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_token_never_ticks() {
    let token = CancellationToken::new();
    token.cancel();
    let mut s = TickScheduler::new(ten_seconds());

    // Even with the deadline long past, cancellation wins.
    tokio::time::advance(Duration::from_secs(60)).await;
    assert!(s.wait_or_cancelled(&token).await.is_none());
    assert_eq!(s.tick_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_sleep_wakes_promptly() {
    let token = CancellationToken::new();
    let mut s = TickScheduler::new(ten_seconds());

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        canceller.cancel();
    });

    let start = tokio::time::Instant::now();
    let result = s.wait_or_cancelled(&token).await;

    assert!(result.is_none());
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(s.tick_count(), 0);
}

// =========================================================================
// Integration: loop pattern used by room timers
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_loop_pattern_stops_on_cancel() {
    let token = CancellationToken::new();
    let mut s = TickScheduler::new(ten_seconds());

    let canceller = token.clone();
    tokio::spawn(async move {
        // Three ticks at 10s, 20s, 30s; cancel at 35s.
        tokio::time::sleep(Duration::from_secs(35)).await;
        canceller.cancel();
    });

    let mut fired = 0u64;
    while let Some(info) = s.wait_or_cancelled(&token).await {
        fired += 1;
        assert_eq!(info.tick, fired);
    }

    assert_eq!(fired, 3);
}
