//! Time-based progress estimation for engines without boundary signals.

use std::time::Duration;

use tokio::time::Instant;

/// Index a constant-rate reader would have reached after `elapsed`.
///
/// Clamped to the last token so the estimate never runs off the end of the
/// sequence. Returns `None` when there are no tokens.
pub fn estimate_index(elapsed: Duration, interval: Duration, token_count: usize) -> Option<usize> {
    let last = token_count.checked_sub(1)?;
    if interval.is_zero() {
        return Some(last);
    }
    let steps = elapsed.as_micros() / interval.as_micros().max(1);
    Some(usize::try_from(steps).map_or(last, |s| s.min(last)))
}

/// Per-token interval at `rate`, from the 1.0x baseline.
#[must_use]
pub fn token_interval(ms_per_token: u64, rate: f32) -> Duration {
    let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let micros = (ms_per_token as f64 * 1000.0 / f64::from(rate)).round() as u64;
    Duration::from_micros(micros)
}

/// A running estimate anchored at the moment speech started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackEstimator {
    started_at: Instant,
    interval: Duration,
}

impl FallbackEstimator {
    pub fn start(started_at: Instant, ms_per_token: u64, rate: f32) -> Self {
        Self {
            started_at,
            interval: token_interval(ms_per_token, rate),
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Estimated token index at `now`.
    pub fn index_at(&self, now: Instant, token_count: usize) -> Option<usize> {
        estimate_index(
            now.saturating_duration_since(self.started_at),
            self.interval,
            token_count,
        )
    }

    /// The next moment the estimate changes after `now`.
    pub fn next_tick(&self, now: Instant) -> Instant {
        let elapsed = now.saturating_duration_since(self.started_at);
        let interval_us = self.interval.as_micros().max(1);
        let next_step = elapsed.as_micros() / interval_us + 1;
        let offset = u64::try_from(next_step * interval_us).unwrap_or(u64::MAX);
        self.started_at + Duration::from_micros(offset)
    }
}
