//! Fixed-period tick scheduler for Pongforge.
//!
//! Drives the physics-and-broadcast loop at a constant cadence (16 ms by
//! default) with overrun detection, a skip/drop policy for late ticks, and
//! budget monitoring of how long each tick's work took.
//!
//! # Integration
//!
//! The scheduler sits inside the hub actor's `tokio::select!` loop, so a tick
//! and an inbound command can never interleave:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle command */ }
//!         _ = scheduler.wait_for_tick() => {
//!             coordinator.tick();
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a tick fires late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Forget the missed deadlines and schedule the next tick one period
    /// from now.
    #[default]
    Skip,
    /// Keep the planned cadence: the next tick is due one period after the
    /// missed deadline, so late ticks fire back to back until caught up.
    Drop,
}

/// Configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks.
    pub period: Duration,
    /// Late-tick handling.
    pub policy: TickPolicy,
    /// Fraction of `period` (0.0–1.0) above which a tick's work is logged as
    /// approaching the budget. Default: 0.80.
    pub budget_warn_threshold: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(16),
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
        }
    }
}

impl TickConfig {
    /// Shortest accepted period.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// A config with the given period and default everything else.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to run.
    ///
    /// Called by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(
                period_us = self.period.as_micros() as u64,
                "tick period below minimum, clamping to 1ms"
            );
            self.period = Self::MIN_PERIOD;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number, starting at 1.
    pub tick: u64,
    /// `true` if this tick fired more than 10% of a period late.
    pub overrun: bool,
    /// Whole periods skipped because of the overrun (always 0 under
    /// [`TickPolicy::Drop`]).
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime metrics for the scheduler.
///
/// Timing values refer to the work reported through
/// [`TickScheduler::record_tick_end`].
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
    /// Exponential moving average of tick work time (α = 0.1).
    pub avg_tick_time: Duration,
    pub max_tick_time: Duration,
    /// Last tick's work time as a fraction of the period. >1.0 is an overrun.
    pub budget_utilization: f64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-period tick scheduler.
pub struct TickScheduler {
    config: TickConfig,
    tick_count: u64,
    /// When the next tick is due (Tokio instant for `sleep_until`).
    next_tick: TokioInstant,
    /// Wall-clock start of the current tick's work.
    tick_start: Option<Instant>,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// Creates a scheduler whose first tick is due one period from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        debug!(
            period_ms = config.period.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick scheduler created"
        );
        Self {
            next_tick: TokioInstant::now() + config.period,
            config,
            tick_count: 0,
            tick_start: None,
            metrics: TickMetrics::default(),
        }
    }

    /// Waits until the next tick is due.
    ///
    /// Cancel-safe: if the future is dropped inside `select!` before the
    /// deadline, nothing is recorded and the same deadline is awaited again.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let period = self.config.period;
        let due = self.next_tick;

        time::sleep_until(due).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        let late_by = now.saturating_duration_since(due);
        let overrun = late_by > period / 10;
        let mut ticks_skipped = 0;

        self.next_tick = match self.config.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped = (late_by.as_nanos() / period.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "tick overrun, skipping ahead"
                        );
                    }
                }
                now + period
            }
            TickPolicy::Drop => {
                if overrun {
                    warn!(
                        tick = self.tick_count,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick overrun, keeping planned cadence"
                    );
                }
                due + period
            }
        };

        if overrun {
            self.metrics.total_overruns += 1;
        }
        self.metrics.total_skipped += ticks_skipped;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            overrun,
            ticks_skipped,
        }
    }

    /// Records that the current tick's work has finished.
    ///
    /// Updates the budget metrics and logs when the work used more than the
    /// warn threshold (or all) of the period. A call without a preceding
    /// [`wait_for_tick`](Self::wait_for_tick) does nothing.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        let budget = self.config.period;
        let utilization = elapsed.as_secs_f64() / budget.as_secs_f64();
        self.metrics.budget_utilization = utilization;

        if utilization >= 1.0 {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = budget.as_secs_f64() * 1000.0,
                "tick exceeded budget"
            );
        } else if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick approaching budget limit"
            );
        }

        if elapsed > self.metrics.max_tick_time {
            self.metrics.max_tick_time = elapsed;
        }
        let alpha = 0.1;
        let prev = self.metrics.avg_tick_time.as_secs_f64();
        self.metrics.avg_tick_time =
            Duration::from_secs_f64(prev * (1.0 - alpha) + elapsed.as_secs_f64() * alpha);
    }

    /// Number of ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured period.
    pub fn period(&self) -> Duration {
        self.config.period
    }

    /// Current metrics.
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }
}
