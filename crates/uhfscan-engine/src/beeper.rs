//! Audio feedback for inventory and locate screens.
//!
//! Inventory feedback is a steady beep while tags keep arriving, driven by a
//! Tokio task independent of the polling thread. Locate feedback is paced by
//! signal proximity and driven from the locate session itself.

use crate::config::EngineConfig;
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, trace};

/// Plays one feedback beep.
pub trait SoundPlayer: Send + Sync {
    fn play(&self);
}

/// When a tag was last seen, shared between a session and the beeper.
///
/// Timestamps use Tokio's clock so that paused-time tests control them.
#[derive(Debug, Default)]
pub struct TagPresence {
    last_seen: Mutex<Option<Instant>>,
}

impl TagPresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a tag as seen now.
    pub fn mark(&self) {
        self.mark_at(Instant::now());
    }

    pub fn mark_at(&self, at: Instant) {
        *self.last_seen.lock() = Some(at);
    }

    pub fn clear(&self) {
        *self.last_seen.lock() = None;
    }

    pub fn is_present(&self) -> bool {
        self.last_seen.lock().is_some()
    }

    /// Whether a tag was seen less than `window` ago.
    ///
    /// A stale sighting is cleared, so a silence is only observed once.
    pub fn poll(&self, window: Duration) -> bool {
        self.poll_at(window, Instant::now())
    }

    fn poll_at(&self, window: Duration, now: Instant) -> bool {
        let mut last_seen = self.last_seen.lock();
        match *last_seen {
            Some(seen) if now.saturating_duration_since(seen) < window => true,
            Some(_) => {
                *last_seen = None;
                false
            }
            None => false,
        }
    }
}

/// Beeper timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeeperConfig {
    /// Period between beeps.
    pub interval: Duration,

    /// Silence after which beeping stops.
    pub loss_window: Duration,
}

impl Default for BeeperConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for BeeperConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            interval: config.beep_interval(),
            loss_window: config.audio_loss(),
        }
    }
}

/// Spawns the inventory feedback task.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackBeeper;

impl FeedbackBeeper {
    /// Start beeping every `config.interval` while `presence` reports a
    /// recent tag.
    ///
    /// Must be called within a Tokio runtime. The task runs until
    /// [`BeeperHandle::stop`] is called, independently of the engine.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use uhfscan_engine::{BeeperConfig, FeedbackBeeper, SoundPlayer, TagPresence};
    ///
    /// struct Silent;
    /// impl SoundPlayer for Silent {
    ///     fn play(&self) {}
    /// }
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let presence = Arc::new(TagPresence::new());
    ///     let beeper = FeedbackBeeper::spawn(Arc::new(Silent), presence, BeeperConfig::default());
    ///     beeper.stop();
    /// }
    /// ```
    pub fn spawn(
        player: Arc<dyn SoundPlayer>,
        presence: Arc<TagPresence>,
        config: BeeperConfig,
    ) -> BeeperHandle {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if presence.poll(config.loss_window) {
                    trace!("Feedback beep");
                    player.play();
                }
            }
        });

        debug!(interval_ms = config.interval.as_millis() as u64, "Feedback beeper started");
        BeeperHandle { task }
    }
}

/// Handle to a running feedback task.
#[derive(Debug)]
pub struct BeeperHandle {
    task: JoinHandle<()>,
}

impl BeeperHandle {
    /// Cancel the task. No beep is played after the next await point.
    pub fn stop(&self) {
        self.task.abort();
        debug!("Feedback beeper stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the task and wait for it to terminate.
    pub async fn shutdown(self) {
        self.task.abort();
        // Cancellation is the expected outcome.
        let _ = self.task.await;
    }
}

/// Paces locate beeps by proximity: the closer the tag, the faster.
///
/// | proximity | beep |
/// |-----------|------|
/// | > 30 | every read |
/// | > 20 | every 300 ms |
/// | > 10 | every 600 ms |
/// | > 0 | every 900 ms |
/// | 0 | never |
#[derive(Debug, Clone, Default)]
pub struct ProximityCadence {
    last_beep: Option<std::time::Instant>,
}

impl ProximityCadence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum gap between beeps at `proximity`, `None` for silence.
    pub fn interval_for(proximity: u32) -> Option<Duration> {
        match proximity {
            31.. => Some(Duration::ZERO),
            21..=30 => Some(Duration::from_millis(300)),
            11..=20 => Some(Duration::from_millis(600)),
            1..=10 => Some(Duration::from_millis(900)),
            0 => None,
        }
    }

    /// Whether a read at `proximity` should beep at `now`.
    pub fn should_beep(&mut self, proximity: u32, now: std::time::Instant) -> bool {
        let Some(interval) = Self::interval_for(proximity) else {
            return false;
        };
        let due = self
            .last_beep
            .is_none_or(|last| now.saturating_duration_since(last) >= interval);
        if due {
            self.last_beep = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_beep = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPlayer {
        beeps: AtomicUsize,
    }

    impl CountingPlayer {
        fn beeps(&self) -> usize {
            self.beeps.load(Ordering::SeqCst)
        }
    }

    impl SoundPlayer for CountingPlayer {
        fn play(&self) {
            self.beeps.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_beeps_while_tags_arrive() {
        let player = Arc::new(CountingPlayer::default());
        let presence = Arc::new(TagPresence::new());
        presence.mark();

        let beeper = FeedbackBeeper::spawn(player.clone(), presence.clone(), BeeperConfig::default());

        tokio::time::sleep(ms(10)).await;
        assert_eq!(player.beeps(), 1);

        tokio::time::sleep(ms(290)).await;
        presence.mark();

        tokio::time::sleep(ms(310)).await;
        assert_eq!(player.beeps(), 2);

        tokio::time::sleep(ms(600)).await;
        assert_eq!(player.beeps(), 2);
        assert!(!presence.is_present());

        tokio::time::sleep(ms(1200)).await;
        assert_eq!(player.beeps(), 2);

        beeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_without_tags() {
        let player = Arc::new(CountingPlayer::default());
        let presence = Arc::new(TagPresence::new());

        let beeper = FeedbackBeeper::spawn(player.clone(), presence, BeeperConfig::default());
        tokio::time::sleep(ms(5000)).await;

        assert_eq!(player.beeps(), 0);
        beeper.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_task() {
        let player = Arc::new(CountingPlayer::default());
        let presence = Arc::new(TagPresence::new());

        let beeper = FeedbackBeeper::spawn(player.clone(), presence.clone(), BeeperConfig::default());
        tokio::time::sleep(ms(10)).await;
        beeper.stop();
        tokio::time::sleep(ms(10)).await;
        assert!(beeper.is_finished());

        presence.mark();
        tokio::time::sleep(ms(3000)).await;
        assert_eq!(player.beeps(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_poll_clears_stale() {
        let presence = TagPresence::new();
        assert!(!presence.poll(ms(600)));

        presence.mark();
        tokio::time::advance(ms(599)).await;
        assert!(presence.poll(ms(600)));

        tokio::time::advance(ms(1)).await;
        assert!(!presence.poll(ms(600)));
        assert!(!presence.is_present());
    }

    #[rstest]
    #[case(45, Some(0))]
    #[case(31, Some(0))]
    #[case(30, Some(300))]
    #[case(21, Some(300))]
    #[case(20, Some(600))]
    #[case(11, Some(600))]
    #[case(10, Some(900))]
    #[case(1, Some(900))]
    #[case(0, None)]
    fn test_cadence_interval(#[case] proximity: u32, #[case] expected_ms: Option<u64>) {
        assert_eq!(ProximityCadence::interval_for(proximity), expected_ms.map(ms));
    }

    #[test]
    fn test_cadence_paces_beeps() {
        let t0 = std::time::Instant::now();
        let mut cadence = ProximityCadence::new();

        assert!(cadence.should_beep(25, t0));
        assert!(!cadence.should_beep(25, t0 + ms(299)));
        assert!(cadence.should_beep(25, t0 + ms(300)));

        assert!(cadence.should_beep(40, t0 + ms(301)));
        assert!(cadence.should_beep(40, t0 + ms(301)));

        assert!(!cadence.should_beep(0, t0 + ms(5000)));
    }

    #[test]
    fn test_cadence_reset() {
        let t0 = std::time::Instant::now();
        let mut cadence = ProximityCadence::new();
        assert!(cadence.should_beep(5, t0));
        assert!(!cadence.should_beep(5, t0 + ms(100)));

        cadence.reset();
        assert!(cadence.should_beep(5, t0 + ms(100)));
    }

    #[test]
    fn test_beeper_config_from_engine_config() {
        let config = EngineConfig {
            beep_interval_ms: 250,
            audio_loss_ms: 900,
            ..EngineConfig::default()
        };
        let beeper = BeeperConfig::from(&config);
        assert_eq!(beeper.interval, ms(250));
        assert_eq!(beeper.loss_window, ms(900));
    }
}
