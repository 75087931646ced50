//! The inventory engine and its polling loop.
//!
//! One dedicated OS thread drains the reader buffer for the lifetime of the
//! engine. What the thread does with each record depends on the current
//! [`OperatingMode`]:
//!
//! ```text
//!                      ┌──────────────────────────────┐
//!  set_mode / ────────►│ SinkSlot (mode, sink, gen)   │
//!  begin_session       └──────────────┬───────────────┘
//!                                     │ load() per iteration
//!  ┌───────────┐  read_next_tag  ┌────▼──────────┐  on_tag / on_rate /
//!  │ TagSource │────────────────►│ InventoryLoop │  on_tag_lost
//!  └───────────┘                 └────┬──────────┘─────────────► ResultSink
//!                                     │
//!                    RateCounter, QuiescenceDetector (thread-local)
//! ```
//!
//! Rate and silence state lives only on the loop thread. Other threads swap
//! the binding, toggle read gates and receive callbacks.

use crate::{
    config::EngineConfig,
    error::{EngineError, Result},
    quiescence::QuiescenceDetector,
    rate::RateCounter,
    sink::{Binding, ResultSink, SinkSlot},
};
use parking_lot::{Mutex, RwLock};
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, error, info, trace, warn};
use uhfscan_core::{OperatingMode, OutputPower, TagRecord};
use uhfscan_hardware::{InventoryParams, TagSource};

/// Name of the polling thread.
pub const INVENTORY_THREAD_NAME: &str = "uhfscan-inventory";

/// Power and prefix gates applied in inventory and locate modes.
#[derive(Debug)]
struct ReadGates {
    power: AtomicU8,
    prefix: RwLock<Option<String>>,
}

impl ReadGates {
    fn new(power: OutputPower, prefix: Option<String>) -> Self {
        Self {
            power: AtomicU8::new(power.dbm()),
            prefix: RwLock::new(normalize_prefix(prefix)),
        }
    }

    fn power(&self) -> OutputPower {
        OutputPower::new(self.power.load(Ordering::Relaxed)).unwrap_or_default()
    }

    fn set_power(&self, power: OutputPower) {
        self.power.store(power.dbm(), Ordering::Relaxed);
    }

    fn prefix(&self) -> Option<String> {
        self.prefix.read().clone()
    }

    fn set_prefix(&self, prefix: Option<String>) {
        *self.prefix.write() = normalize_prefix(prefix);
    }

    /// Reason for dropping `record`, if any.
    fn rejects(&self, record: &TagRecord) -> Option<&'static str> {
        if self.power().is_off() {
            return Some("output power is zero");
        }
        match self.prefix.read().as_deref() {
            Some(prefix) if !record.tid_has_prefix(prefix) => Some("TID prefix filter"),
            _ => None,
        }
    }
}

fn normalize_prefix(prefix: Option<String>) -> Option<String> {
    prefix
        .map(|p| p.trim().to_ascii_uppercase())
        .filter(|p| !p.is_empty())
}

/// State shared between the control surface and the loop thread.
#[derive(Debug)]
pub(crate) struct Shared {
    slot: SinkSlot,
    gates: ReadGates,
    destroyed: AtomicBool,
}

impl Shared {
    fn new(config: &EngineConfig, now: Instant) -> Result<Self> {
        Ok(Self {
            slot: SinkSlot::new(now),
            gates: ReadGates::new(config.output_power()?, config.read_filter.clone()),
            destroyed: AtomicBool::new(false),
        })
    }
}

/// What the loop should do before its next iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pace {
    /// A record was pulled; poll again immediately.
    Busy,
    /// The buffer was empty; sleep the poll interval.
    Empty,
    /// No active mode; sleep the idle interval.
    Idle,
}

/// Per-thread loop state, advanced one iteration at a time by [`step`].
///
/// [`step`]: InventoryLoop::step
pub(crate) struct InventoryLoop {
    source: Arc<dyn TagSource>,
    shared: Arc<Shared>,
    rate: RateCounter,
    lost: QuiescenceDetector,
    generation: Option<u64>,
}

impl InventoryLoop {
    pub(crate) fn new(source: Arc<dyn TagSource>, shared: Arc<Shared>, config: &EngineConfig) -> Self {
        Self {
            source,
            shared,
            rate: RateCounter::new(config.rate_window()),
            lost: QuiescenceDetector::new(config.lost_threshold()),
            generation: None,
        }
    }

    fn run(mut self, poll_interval: Duration, idle_interval: Duration) {
        info!(module = %self.source.module(), "Inventory loop started");

        while !self.shared.destroyed.load(Ordering::Acquire) {
            match self.step(Instant::now()) {
                Pace::Busy => {}
                Pace::Empty => thread::sleep(poll_interval),
                Pace::Idle => thread::sleep(idle_interval),
            }
        }

        info!("Inventory loop exited");
    }

    /// Run one iteration at `now`.
    pub(crate) fn step(&mut self, now: Instant) -> Pace {
        let binding = self.shared.slot.load();
        if self.generation != Some(binding.generation()) {
            self.enter(&binding);
        }

        let mode = binding.mode();
        if !mode.is_active() {
            return Pace::Idle;
        }

        if binding.deadline().is_some_and(|deadline| now >= deadline) {
            self.auto_stop(&binding, now);
            return Pace::Idle;
        }

        let sink = binding.sink();

        if mode.uses_rate_window()
            && let Some(reads) = self.rate.maybe_flush(now)
        {
            debug!(reads, "Rate window flushed");
            if let Some(sink) = sink {
                sink.on_rate(reads);
            }
        }

        let Some(record) = self.source.read_next_tag() else {
            if mode.reports_tag_lost() && self.lost.check(now) {
                debug!("Located tag lost");
                if let Some(sink) = sink {
                    sink.on_tag_lost();
                }
            }
            return Pace::Empty;
        };

        if mode.applies_read_gates()
            && let Some(reason) = self.shared.gates.rejects(&record)
        {
            debug!(tid = record.tid(), reason, "Record dropped");
            return Pace::Busy;
        }

        if mode.uses_rate_window() {
            self.rate.record_read(now);
        }
        if mode.uses_rate_window() || mode.reports_tag_lost() {
            self.lost.on_read(now);
        }

        trace!(%mode, tid = record.tid(), epc = record.epc(), rssi = record.rssi_raw(), "Tag read");
        if let Some(sink) = sink {
            sink.on_tag(&record);
        }
        Pace::Busy
    }

    /// Reset per-mode state for a new binding generation.
    fn enter(&mut self, binding: &Binding) {
        if self.rate.is_dirty() || self.lost.is_armed() {
            debug!(mode = %binding.mode(), "Discarding state of previous mode");
        }
        self.generation = Some(binding.generation());
        self.rate.reset();
        self.lost.reset();
        if binding.mode().uses_rate_window() {
            self.rate.start(binding.entered_at());
        }
    }

    fn auto_stop(&mut self, binding: &Binding, now: Instant) {
        if !self
            .shared
            .slot
            .set_mode_if(binding.generation(), OperatingMode::Idle, now)
        {
            return;
        }

        info!(mode = %binding.mode(), "Auto-stop deadline reached");
        if !self.source.stop_inventory() {
            warn!("Reader did not acknowledge inventory stop");
        }
        if let Some(sink) = binding.sink() {
            sink.on_session_end();
        }
    }
}

/// Background inventory engine.
///
/// # Lifecycle
///
/// 1. Create the engine with a reader and configuration
/// 2. Call [`start`](Self::start) once to spawn the polling thread
/// 3. Register a sink and switch modes, or use
///    [`begin_session`](Self::begin_session) / [`end_session`](Self::end_session)
/// 4. Call [`destroy`](Self::destroy) when done (also runs on drop)
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use uhfscan_core::{ModuleKind, OperatingMode};
/// use uhfscan_engine::{EngineConfig, InventoryEngine};
/// use uhfscan_engine::mock::RecordingSink;
/// use uhfscan_hardware::InventoryParams;
/// use uhfscan_hardware::mock::MockTagSource;
///
/// # fn main() -> uhfscan_engine::Result<()> {
/// let (source, _handle) = MockTagSource::new(ModuleKind::Um);
/// let engine = InventoryEngine::new(Arc::new(source), EngineConfig::default())?;
/// engine.start()?;
///
/// let sink = Arc::new(RecordingSink::new());
/// engine.begin_session(OperatingMode::ContinuousInventory, sink, &InventoryParams::default())?;
/// assert_eq!(engine.mode(), OperatingMode::ContinuousInventory);
///
/// engine.end_session();
/// engine.destroy();
/// # Ok(())
/// # }
/// ```
pub struct InventoryEngine {
    source: Arc<dyn TagSource>,
    config: EngineConfig,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl InventoryEngine {
    /// Create an engine in `Idle` mode. The polling thread is not started.
    ///
    /// # Errors
    /// Returns an error if the configuration fails validation.
    pub fn new(source: Arc<dyn TagSource>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let shared = Arc::new(Shared::new(&config, Instant::now())?);
        Ok(Self {
            source,
            config,
            shared,
            worker: Mutex::new(None),
        })
    }

    /// Spawn the polling thread. Calling it again is a no-op.
    ///
    /// # Errors
    /// Returns `EngineError::Destroyed` after [`destroy`](Self::destroy), or
    /// `EngineError::Spawn` if the OS refuses a new thread.
    pub fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        if self.is_destroyed() {
            return Err(EngineError::Destroyed);
        }
        if worker.is_some() {
            debug!("Inventory engine already started");
            return Ok(());
        }

        let inventory_loop =
            InventoryLoop::new(Arc::clone(&self.source), Arc::clone(&self.shared), &self.config);
        let poll_interval = self.config.poll_interval();
        let idle_interval = self.config.idle_interval();

        let handle = thread::Builder::new()
            .name(INVENTORY_THREAD_NAME.to_string())
            .spawn(move || inventory_loop.run(poll_interval, idle_interval))
            .map_err(|e| {
                error!(error = %e, "Failed to spawn inventory thread");
                EngineError::Spawn(e)
            })?;
        *worker = Some(handle);

        info!(module = %self.source.module(), "Inventory engine started");
        Ok(())
    }

    /// Switch the loop to `mode`.
    ///
    /// Entering `ContinuousInventory` or `Locate` captures the rate-window
    /// origin here, on the caller's thread.
    pub fn set_mode(&self, mode: OperatingMode) {
        let generation = self.shared.slot.set_mode(mode, Instant::now(), None);
        info!(%mode, generation, "Mode changed");
    }

    /// Return to `Idle`. The reader keeps running; see
    /// [`end_session`](Self::end_session).
    pub fn stop(&self) {
        self.set_mode(OperatingMode::Idle);
    }

    /// Replace the result sink. The previous sink receives no further
    /// callbacks once the loop's next iteration begins.
    pub fn register_sink(&self, sink: Arc<dyn ResultSink>) {
        self.shared.slot.register(sink);
        debug!("Result sink registered");
    }

    /// Start the reader with `params`, then bind `sink` and enter `mode`.
    ///
    /// The session's output power becomes the engine's power gate. When
    /// `params.auto_stop_after` is set, the engine returns to `Idle` on its
    /// own once it elapses and notifies the sink through
    /// [`ResultSink::on_session_end`].
    ///
    /// # Errors
    /// Returns `EngineError::Destroyed` after [`destroy`](Self::destroy), or
    /// `EngineError::Hardware` if the reader refuses to start. The mode,
    /// sink and power gate are left unchanged on error.
    pub fn begin_session(
        &self,
        mode: OperatingMode,
        sink: Arc<dyn ResultSink>,
        params: &InventoryParams,
    ) -> Result<()> {
        if self.is_destroyed() {
            return Err(EngineError::Destroyed);
        }

        if let Err(e) = self.source.start_inventory(params) {
            warn!(error = %e, %mode, "Reader refused to start inventory");
            return Err(e.into());
        }

        let now = Instant::now();
        let deadline = params.auto_stop_after.map(|after| now + after);
        self.shared.gates.set_power(params.power);
        let generation = self.shared.slot.bind(sink, mode, now, deadline);
        info!(
            %mode,
            generation,
            power = %params.power,
            auto_stop_ms = params.auto_stop_after.map(|d| d.as_millis() as u64),
            "Session started"
        );
        Ok(())
    }

    /// Return to `Idle` and stop the reader.
    ///
    /// Returns `true` if the reader acknowledged the stop.
    pub fn end_session(&self) -> bool {
        self.stop();
        let acknowledged = self.source.stop_inventory();
        if acknowledged {
            info!("Session ended");
        } else {
            warn!("Reader did not acknowledge inventory stop");
        }
        acknowledged
    }

    /// Set the power gate. Zero drops every record in gated modes.
    pub fn set_output_power(&self, power: OutputPower) {
        self.shared.gates.set_power(power);
        info!(%power, "Output power changed");
    }

    pub fn output_power(&self) -> OutputPower {
        self.shared.gates.power()
    }

    /// Accept only records whose TID starts with `prefix`.
    ///
    /// The prefix is compared case-insensitively; `None` or an empty string
    /// removes the filter.
    pub fn set_read_filter(&self, prefix: Option<String>) {
        self.shared.gates.set_prefix(prefix);
        info!(filter = ?self.shared.gates.prefix(), "Read filter changed");
    }

    pub fn read_filter(&self) -> Option<String> {
        self.shared.gates.prefix()
    }

    /// Current operating mode.
    pub fn mode(&self) -> OperatingMode {
        self.shared.slot.load().mode()
    }

    /// Whether the polling thread is alive.
    pub fn is_running(&self) -> bool {
        !self.is_destroyed() && self.worker.lock().is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::Acquire)
    }

    pub fn source(&self) -> &Arc<dyn TagSource> {
        &self.source
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stop the polling thread for good and wait for it to exit.
    ///
    /// The wait is bounded by one loop iteration. Calling it again, or from
    /// inside a sink callback, does not block.
    pub fn destroy(&self) {
        if self.shared.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared
            .slot
            .set_mode(OperatingMode::Idle, Instant::now(), None);

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                debug!("Destroy requested from the inventory thread; not joining");
            } else if handle.join().is_err() {
                warn!("Inventory thread panicked");
            }
        }

        info!("Inventory engine destroyed");
    }
}

impl fmt::Debug for InventoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryEngine")
            .field("module", &self.source.module())
            .field("mode", &self.mode())
            .field("destroyed", &self.is_destroyed())
            .field("config", &self.config)
            .finish()
    }
}

impl Drop for InventoryEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}
