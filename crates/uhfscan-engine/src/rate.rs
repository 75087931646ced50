//! Per-window read-rate accounting.
//!
//! The counter is driven entirely by caller-supplied instants, so it never
//! reads the clock itself.
//!
//! The window anchor is set lazily by the first read after a start or a
//! flush. A mode that sees no reads therefore never flushes, and a flush
//! only ever reports reads made before it.

use std::time::{Duration, Instant};
use uhfscan_core::constants::RATE_WINDOW_MS;

/// Counts reads and reports them once per elapsed window.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use uhfscan_engine::RateCounter;
///
/// let t0 = Instant::now();
/// let mut rate = RateCounter::default();
/// rate.start(t0);
///
/// rate.record_read(t0 + Duration::from_millis(100));
/// rate.record_read(t0 + Duration::from_millis(200));
/// assert_eq!(rate.maybe_flush(t0 + Duration::from_millis(900)), None);
/// assert_eq!(rate.maybe_flush(t0 + Duration::from_millis(1000)), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct RateCounter {
    window: Duration,
    origin: Option<Instant>,
    anchor: Option<Instant>,
    count: u64,
}

impl RateCounter {
    /// Create a counter with a custom window length.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            origin: None,
            anchor: None,
            count: 0,
        }
    }

    /// Begin counting for a freshly entered mode.
    ///
    /// `origin` becomes the anchor of the first window once a read arrives.
    pub fn start(&mut self, origin: Instant) {
        self.origin = Some(origin);
        self.anchor = None;
        self.count = 0;
    }

    /// Count one read.
    pub fn record_read(&mut self, now: Instant) {
        self.count += 1;
        if self.anchor.is_none() {
            self.anchor = Some(self.origin.take().unwrap_or(now));
        }
    }

    /// Report and reset the count if a full window has elapsed since the
    /// anchor.
    pub fn maybe_flush(&mut self, now: Instant) -> Option<u64> {
        let anchor = self.anchor?;
        if now.saturating_duration_since(anchor) < self.window {
            return None;
        }
        self.anchor = None;
        Some(std::mem::take(&mut self.count))
    }

    /// Drop all window state.
    pub fn reset(&mut self) {
        self.origin = None;
        self.anchor = None;
        self.count = 0;
    }

    /// Whether any window state remains.
    pub fn is_dirty(&self) -> bool {
        self.origin.is_some() || self.anchor.is_some() || self.count > 0
    }

    /// Reads counted in the current window.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateCounter {
    fn default() -> Self {
        Self::new(Duration::from_millis(RATE_WINDOW_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_no_reads_no_flush() {
        let t0 = Instant::now();
        let mut rate = RateCounter::default();
        rate.start(t0);

        assert_eq!(rate.maybe_flush(t0 + ms(5000)), None);
    }

    #[test]
    fn test_first_window_anchored_at_origin() {
        let t0 = Instant::now();
        let mut rate = RateCounter::default();
        rate.start(t0);

        rate.record_read(t0 + ms(900));
        assert_eq!(rate.maybe_flush(t0 + ms(999)), None);
        assert_eq!(rate.maybe_flush(t0 + ms(1000)), Some(1));
    }

    #[test]
    fn test_next_window_anchored_at_first_read() {
        let t0 = Instant::now();
        let mut rate = RateCounter::default();
        rate.start(t0);

        rate.record_read(t0 + ms(10));
        assert_eq!(rate.maybe_flush(t0 + ms(1000)), Some(1));

        rate.record_read(t0 + ms(1500));
        rate.record_read(t0 + ms(1600));
        assert_eq!(rate.maybe_flush(t0 + ms(2400)), None);
        assert_eq!(rate.maybe_flush(t0 + ms(2500)), Some(2));
        assert_eq!(rate.maybe_flush(t0 + ms(9000)), None);
    }

    #[test]
    fn test_reset_clears_residual_state() {
        let t0 = Instant::now();
        let mut rate = RateCounter::default();
        assert!(!rate.is_dirty());

        rate.start(t0);
        rate.record_read(t0 + ms(1));
        assert!(rate.is_dirty());

        rate.reset();
        assert!(!rate.is_dirty());
        assert_eq!(rate.count(), 0);
        assert_eq!(rate.maybe_flush(t0 + ms(5000)), None);
    }

    #[test]
    fn test_restart_discards_previous_count() {
        let t0 = Instant::now();
        let mut rate = RateCounter::default();
        rate.start(t0);
        rate.record_read(t0 + ms(1));
        rate.record_read(t0 + ms(2));

        let t1 = t0 + ms(400);
        rate.start(t1);
        rate.record_read(t1 + ms(1));
        assert_eq!(rate.maybe_flush(t1 + ms(1000)), Some(1));
    }

    proptest! {
        #[test]
        fn prop_flushes_sum_to_reads(gaps in proptest::collection::vec(0u64..700, 1..200)) {
            let t0 = Instant::now();
            let mut rate = RateCounter::default();
            rate.start(t0);

            let mut now = t0;
            let mut last_flush: Option<Instant> = None;
            let mut flushed = 0u64;
            for gap in &gaps {
                now += ms(*gap);
                if let Some(count) = rate.maybe_flush(now) {
                    if let Some(previous) = last_flush {
                        prop_assert!(now.duration_since(previous) >= ms(1000));
                    }
                    last_flush = Some(now);
                    flushed += count;
                }
                rate.record_read(now);
            }

            prop_assert_eq!(flushed + rate.count(), gaps.len() as u64);
        }
    }
}
