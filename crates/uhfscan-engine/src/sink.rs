//! Result delivery from the polling loop.
//!
//! The loop reports to exactly one [`ResultSink`] at a time. The sink, the
//! operating mode and the mode's generation are published together as one
//! immutable [`Binding`], so the loop always sees a consistent pair: a
//! record pulled for locate is never delivered to an inventory consumer.

use parking_lot::RwLock;
use std::{fmt, sync::Arc, time::Instant};
use uhfscan_core::{OperatingMode, TagRecord};

/// Consumer of loop events.
///
/// All callbacks run on the engine thread. Implementations must return
/// quickly and forward work elsewhere; they must not block on UI state.
pub trait ResultSink: Send + Sync {
    /// A record passed the mode's gates.
    fn on_tag(&self, record: &TagRecord);

    /// A rate window closed with `reads` accepted reads.
    fn on_rate(&self, reads: u64);

    /// The located tag has been silent past the loss threshold.
    fn on_tag_lost(&self);

    /// The engine ended the session on its own, e.g. on auto-stop.
    fn on_session_end(&self) {}
}

/// Immutable snapshot of what the loop is serving.
#[derive(Clone)]
pub struct Binding {
    mode: OperatingMode,
    sink: Option<Arc<dyn ResultSink>>,
    generation: u64,
    entered_at: Instant,
    deadline: Option<Instant>,
}

impl Binding {
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn sink(&self) -> Option<&Arc<dyn ResultSink>> {
        self.sink.as_ref()
    }

    /// Incremented on every mode change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the current mode was entered, on the caller's thread.
    pub fn entered_at(&self) -> Instant {
        self.entered_at
    }

    /// When the engine should leave the mode on its own.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("mode", &self.mode)
            .field("has_sink", &self.sink.is_some())
            .field("generation", &self.generation)
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// Thread-safe single slot holding the current [`Binding`].
///
/// Writers replace the whole binding; readers clone the `Arc` and release
/// the lock before invoking any callback.
#[derive(Debug)]
pub struct SinkSlot {
    current: RwLock<Arc<Binding>>,
}

impl SinkSlot {
    /// Create an idle slot with no sink.
    pub fn new(now: Instant) -> Self {
        Self {
            current: RwLock::new(Arc::new(Binding {
                mode: OperatingMode::Idle,
                sink: None,
                generation: 0,
                entered_at: now,
                deadline: None,
            })),
        }
    }

    /// Current binding.
    pub fn load(&self) -> Arc<Binding> {
        Arc::clone(&self.current.read())
    }

    /// Replace the sink, keeping the mode and generation.
    pub fn register(&self, sink: Arc<dyn ResultSink>) {
        let mut current = self.current.write();
        let next = Binding {
            sink: Some(sink),
            ..Binding::clone(&current)
        };
        *current = Arc::new(next);
    }

    /// Enter `mode` at `entered_at`, returning the new generation.
    pub fn set_mode(&self, mode: OperatingMode, entered_at: Instant, deadline: Option<Instant>) -> u64 {
        let mut current = self.current.write();
        let generation = current.generation.wrapping_add(1);
        let next = Binding {
            mode,
            generation,
            entered_at,
            deadline,
            ..Binding::clone(&current)
        };
        *current = Arc::new(next);
        generation
    }

    /// Replace the sink and enter `mode` in one write, returning the new
    /// generation.
    pub fn bind(
        &self,
        sink: Arc<dyn ResultSink>,
        mode: OperatingMode,
        entered_at: Instant,
        deadline: Option<Instant>,
    ) -> u64 {
        let mut current = self.current.write();
        let generation = current.generation.wrapping_add(1);
        *current = Arc::new(Binding {
            mode,
            sink: Some(sink),
            generation,
            entered_at,
            deadline,
        });
        generation
    }

    /// Enter `mode` only if the slot is still at `generation`.
    ///
    /// Returns `false` when another caller changed the mode first.
    pub fn set_mode_if(&self, generation: u64, mode: OperatingMode, entered_at: Instant) -> bool {
        let mut current = self.current.write();
        if current.generation != generation {
            return false;
        }
        let next = Binding {
            mode,
            generation: generation.wrapping_add(1),
            entered_at,
            deadline: None,
            ..Binding::clone(&current)
        };
        *current = Arc::new(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSink {
        tags: AtomicUsize,
    }

    impl ResultSink for CountingSink {
        fn on_tag(&self, _record: &TagRecord) {
            self.tags.fetch_add(1, Ordering::Relaxed);
        }

        fn on_rate(&self, _reads: u64) {}

        fn on_tag_lost(&self) {}
    }

    #[test]
    fn test_new_slot_is_idle() {
        let slot = SinkSlot::new(Instant::now());
        let binding = slot.load();
        assert_eq!(binding.mode(), OperatingMode::Idle);
        assert!(binding.sink().is_none());
        assert_eq!(binding.generation(), 0);
    }

    #[test]
    fn test_register_keeps_mode() {
        let t0 = Instant::now();
        let slot = SinkSlot::new(t0);
        slot.set_mode(OperatingMode::Locate, t0, None);

        slot.register(Arc::new(CountingSink::default()));

        let binding = slot.load();
        assert_eq!(binding.mode(), OperatingMode::Locate);
        assert_eq!(binding.generation(), 1);
        assert!(binding.sink().is_some());
    }

    #[test]
    fn test_bind_swaps_sink_and_mode_together() {
        let t0 = Instant::now();
        let slot = SinkSlot::new(t0);
        let first: Arc<dyn ResultSink> = Arc::new(CountingSink::default());
        let second: Arc<dyn ResultSink> = Arc::new(CountingSink::default());

        slot.bind(first.clone(), OperatingMode::Locate, t0, None);
        let generation = slot.bind(second.clone(), OperatingMode::LockRead, t0, None);

        let binding = slot.load();
        assert_eq!(generation, 2);
        assert_eq!(binding.mode(), OperatingMode::LockRead);
        let bound = binding.sink().unwrap();
        assert!(std::ptr::addr_eq(Arc::as_ptr(bound), Arc::as_ptr(&second)));
        assert!(!std::ptr::addr_eq(Arc::as_ptr(bound), Arc::as_ptr(&first)));
    }

    #[test]
    fn test_register_supersedes_previous_sink() {
        let slot = SinkSlot::new(Instant::now());
        let first = Arc::new(CountingSink::default());
        let second = Arc::new(CountingSink::default());

        slot.register(first.clone());
        slot.register(second.clone());

        let record = TagRecord::builder("E280", "3008").build().unwrap();
        if let Some(sink) = slot.load().sink() {
            sink.on_tag(&record);
        }
        assert_eq!(first.tags.load(Ordering::Relaxed), 0);
        assert_eq!(second.tags.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_loaded_binding_is_a_snapshot() {
        let t0 = Instant::now();
        let slot = SinkSlot::new(t0);
        let before = slot.load();

        slot.set_mode(OperatingMode::ContinuousInventory, t0, None);

        assert_eq!(before.mode(), OperatingMode::Idle);
        assert_eq!(slot.load().mode(), OperatingMode::ContinuousInventory);
    }

    #[test]
    fn test_set_mode_if_detects_race() {
        let t0 = Instant::now();
        let slot = SinkSlot::new(t0);
        let generation = slot.set_mode(OperatingMode::ContinuousInventory, t0, Some(t0));

        slot.set_mode(OperatingMode::Locate, t0, None);
        assert!(!slot.set_mode_if(generation, OperatingMode::Idle, t0));
        assert_eq!(slot.load().mode(), OperatingMode::Locate);

        let generation = slot.load().generation();
        assert!(slot.set_mode_if(generation, OperatingMode::Idle, t0));
        let binding = slot.load();
        assert_eq!(binding.mode(), OperatingMode::Idle);
        assert_eq!(binding.deadline(), None);
    }
}
