//! Silence detection for tag disappearance.

use std::time::{Duration, Instant};
use uhfscan_core::constants::TAG_LOST_THRESHOLD_MS;

/// Edge-triggered detector that fires once per silence episode.
///
/// After a read, [`check`](Self::check) fires the first time the silence
/// exceeds the threshold, then stays quiet until the next read.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use uhfscan_engine::QuiescenceDetector;
///
/// let t0 = Instant::now();
/// let mut lost = QuiescenceDetector::new(Duration::from_millis(2000));
///
/// lost.on_read(t0);
/// assert!(!lost.check(t0 + Duration::from_millis(2000)));
/// assert!(lost.check(t0 + Duration::from_millis(2001)));
/// assert!(!lost.check(t0 + Duration::from_millis(5000)));
/// ```
#[derive(Debug, Clone)]
pub struct QuiescenceDetector {
    threshold: Duration,
    last_seen: Option<Instant>,
}

impl QuiescenceDetector {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_seen: None,
        }
    }

    /// Mark a read at `now`.
    pub fn on_read(&mut self, now: Instant) {
        self.last_seen = Some(now);
    }

    /// Whether the silence since the last read just exceeded the threshold.
    pub fn check(&mut self, now: Instant) -> bool {
        match self.last_seen {
            Some(seen) if now.saturating_duration_since(seen) > self.threshold => {
                self.last_seen = None;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.last_seen = None;
    }

    /// Whether a read is being watched.
    pub fn is_armed(&self) -> bool {
        self.last_seen.is_some()
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}

impl Default for QuiescenceDetector {
    fn default() -> Self {
        Self::new(Duration::from_millis(TAG_LOST_THRESHOLD_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_never_fires_without_read() {
        let t0 = Instant::now();
        let mut lost = QuiescenceDetector::default();
        assert!(!lost.check(t0 + ms(10_000)));
        assert!(!lost.is_armed());
    }

    #[rstest]
    #[case(1999, false)]
    #[case(2000, false)]
    #[case(2001, true)]
    #[case(2500, true)]
    fn test_threshold_is_strict(#[case] silence: u64, #[case] fires: bool) {
        let t0 = Instant::now();
        let mut lost = QuiescenceDetector::default();
        lost.on_read(t0);
        assert_eq!(lost.check(t0 + ms(silence)), fires);
    }

    #[test]
    fn test_fires_once_per_episode() {
        let t0 = Instant::now();
        let mut lost = QuiescenceDetector::default();
        lost.on_read(t0);

        let fired = (1..=50u64)
            .filter(|step| lost.check(t0 + ms(*step * 100)))
            .count();
        assert_eq!(fired, 1);

        lost.on_read(t0 + ms(6000));
        assert!(lost.check(t0 + ms(8100)));
    }

    #[test]
    fn test_read_rearms_before_firing() {
        let t0 = Instant::now();
        let mut lost = QuiescenceDetector::default();
        lost.on_read(t0);
        lost.on_read(t0 + ms(1500));
        assert!(!lost.check(t0 + ms(2500)));
        assert!(lost.check(t0 + ms(3600)));
    }

    #[test]
    fn test_reset_disarms() {
        let t0 = Instant::now();
        let mut lost = QuiescenceDetector::default();
        lost.on_read(t0);
        lost.reset();
        assert!(!lost.check(t0 + ms(3000)));
    }
}
