//! Fixed-period scheduler for Lexitac room timers.
//!
//! Room timers fire rarely (the palette rotation defaults to every ten
//! seconds) but must stop promptly when the room changes state. This crate
//! provides a [`TickScheduler`] that sleeps until the next period boundary
//! and a cancellation-aware wait built on [`CancellationToken`].
//!
//! # Disabled mode
//!
//! A period of zero disables the scheduler: [`TickScheduler::wait_for_tick`]
//! pends forever, which is what a room wants when rotation is turned off.
//!
//! # Integration
//!
//! ```ignore
//! let mut scheduler = TickScheduler::with_period(Duration::from_secs(10));
//! while let Some(tick) = scheduler.wait_or_cancelled(&token).await {
//!     rotate_palettes(tick.tick);
//! }
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the tick scheduler.
#[derive(Debug, Clone, Default)]
pub struct TickConfig {
    /// Time between ticks. `Duration::ZERO` disables the scheduler.
    pub period: Duration,
}

impl TickConfig {
    /// Shortest period accepted; anything below is raised to this.
    pub const MIN_PERIOD: Duration = Duration::from_millis(10);

    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`]. A non-zero period
    /// below [`Self::MIN_PERIOD`] is raised to it.
    pub fn validated(mut self) -> Self {
        if !self.period.is_zero() && self.period < Self::MIN_PERIOD {
            warn!(
                period_ms = self.period.as_secs_f64() * 1000.0,
                min_ms = Self::MIN_PERIOD.as_millis() as u64,
                "tick period below minimum, clamping"
            );
            self.period = Self::MIN_PERIOD;
        }
        self
    }

    /// `None` when the scheduler is disabled.
    pub fn tick_period(&self) -> Option<Duration> {
        (!self.period.is_zero()).then_some(self.period)
    }
}

/// A fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-period tick scheduler. One per timer task.
///
/// The next deadline is always one period after the previous wake-up, so
/// a late wake-up pushes the cadence back instead of firing a burst.
pub struct TickScheduler {
    period: Option<Duration>,
    tick_count: u64,
    next_tick: Option<Instant>,
}

impl TickScheduler {
    /// Create a new scheduler from config. The first tick is due one
    /// period from now.
    pub fn new(config: TickConfig) -> Self {
        let period = config.validated().tick_period();

        match period {
            None => debug!("tick scheduler created disabled (zero period)"),
            Some(p) => debug!(period_ms = p.as_secs_f64() * 1000.0, "tick scheduler created"),
        }

        Self {
            period,
            tick_count: 0,
            next_tick: period.map(|p| Instant::now() + p),
        }
    }

    pub fn with_period(period: Duration) -> Self {
        Self::new(TickConfig::with_period(period))
    }

    /// Wait until the next tick is due.
    ///
    /// When disabled this future pends forever; `select!` still drives
    /// its other branches.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (deadline, period) = match (self.next_tick, self.period) {
            (Some(next), Some(period)) => (next, period),
            _ => std::future::pending().await,
        };

        time::sleep_until(deadline).await;

        self.tick_count += 1;
        self.next_tick = Some(Instant::now() + period);
        trace!(tick = self.tick_count, "tick fired");

        TickInfo {
            tick: self.tick_count,
        }
    }

    /// Wait for the next tick unless `token` is cancelled first.
    ///
    /// Returns `None` as soon as the token fires, without waiting out the
    /// remaining sleep. Cancellation is checked first, so a token that is
    /// already cancelled never yields another tick.
    pub async fn wait_or_cancelled(
        &mut self,
        token: &CancellationToken,
    ) -> Option<TickInfo> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                trace!(tick = self.tick_count, "tick wait cancelled");
                None
            }
            info = self.wait_for_tick() => Some(info),
        }
    }

    /// Whether this scheduler has a zero period.
    pub fn is_disabled(&self) -> bool {
        self.period.is_none()
    }

    /// Number of ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured period, or `None` when disabled.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_raises_tiny_period() {
        let cfg = TickConfig::with_period(Duration::from_millis(1)).validated();
        assert_eq!(cfg.period, TickConfig::MIN_PERIOD);
    }

    #[test]
    fn test_validated_keeps_zero_period_disabled() {
        let cfg = TickConfig::default().validated();
        assert_eq!(cfg.tick_period(), None);
    }
}
