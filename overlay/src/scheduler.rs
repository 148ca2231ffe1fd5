//! Refresh cadences for the overlay.
//!
//! Two independent tickers: a presentation tick (~60 Hz) that pumps window
//! events and redraws, and a metric tick (1 s) that re-queries the provider
//! and re-asserts window attributes. Redraw must stay responsive to close
//! events at interactive rates; queries and attribute re-assertion are
//! comparatively expensive and only need to happen about once per second.
//!
//! Tickers take the current time as a parameter, so tests drive them with
//! synthetic instants.

use std::time::{Duration, Instant};

/// Presentation (event pump + redraw) period, ~60 Hz.
pub const PRESENTATION_PERIOD: Duration = Duration::from_millis(16);

/// Metric re-query and attribute re-assertion period.
pub const METRIC_PERIOD: Duration = Duration::from_secs(1);

/// A fixed-period cadence. Fires on the first poll, then once per period.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    last: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// True when a full period has elapsed since the last firing (or on the
    /// very first poll). Firing resets the period from `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Time remaining until the next firing; zero if already due.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => (last + self.period).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }
}

/// The overlay's two cadences, bundled.
pub struct RefreshScheduler {
    presentation: Ticker,
    metric: Ticker,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            presentation: Ticker::new(PRESENTATION_PERIOD),
            metric: Ticker::new(METRIC_PERIOD),
        }
    }

    /// Mark a presentation tick. Called once per loop iteration.
    pub fn presentation_tick(&mut self, now: Instant) {
        let _ = self.presentation.due(now);
    }

    /// Whether the metric cadence fires on this tick.
    pub fn metric_due(&mut self, now: Instant) -> bool {
        self.metric.due(now)
    }

    /// How long the loop may sleep before the next presentation tick.
    /// Bounded by the presentation period, so cancellation is always
    /// observed within one tick.
    pub fn frame_budget(&self, now: Instant) -> Duration {
        self.presentation.remaining(now)
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_fires_immediately_then_once_per_period() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(Duration::from_secs(1));

        assert!(ticker.due(t0));
        assert!(!ticker.due(t0 + Duration::from_millis(10)));
        assert!(!ticker.due(t0 + Duration::from_millis(999)));
        assert!(ticker.due(t0 + Duration::from_secs(1)));
        assert!(!ticker.due(t0 + Duration::from_millis(1500)));
        assert!(ticker.due(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn remaining_counts_down_to_zero() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(Duration::from_secs(1));
        assert_eq!(ticker.remaining(t0), Duration::ZERO);

        assert!(ticker.due(t0));
        assert_eq!(ticker.remaining(t0), Duration::from_secs(1));
        assert_eq!(
            ticker.remaining(t0 + Duration::from_millis(400)),
            Duration::from_millis(600)
        );
        assert_eq!(ticker.remaining(t0 + Duration::from_secs(2)), Duration::ZERO);
    }

    #[test]
    fn cadences_are_independent() {
        let t0 = Instant::now();
        let mut scheduler = RefreshScheduler::new();

        // First tick: both cadences fire.
        scheduler.presentation_tick(t0);
        assert!(scheduler.metric_due(t0));

        // 16 ms later the presentation tick runs again but the metric
        // cadence stays quiet.
        let t1 = t0 + PRESENTATION_PERIOD;
        scheduler.presentation_tick(t1);
        assert!(!scheduler.metric_due(t1));

        // After a full second the metric cadence fires again.
        let t2 = t0 + METRIC_PERIOD;
        scheduler.presentation_tick(t2);
        assert!(scheduler.metric_due(t2));
    }

    #[test]
    fn frame_budget_never_exceeds_presentation_period() {
        let t0 = Instant::now();
        let mut scheduler = RefreshScheduler::new();
        scheduler.presentation_tick(t0);
        assert!(scheduler.frame_budget(t0) <= PRESENTATION_PERIOD);
        assert_eq!(scheduler.frame_budget(t0 + PRESENTATION_PERIOD), Duration::ZERO);
    }
}
