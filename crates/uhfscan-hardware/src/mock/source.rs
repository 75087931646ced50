//! Mock UHF reader implementation for testing and development.
//!
//! The mock behaves like a vendor driver buffer: records presented through
//! the handle are queued and handed out one at a time by
//! [`TagSource::read_next_tag`]. The buffer drains whether or not an
//! inventory round is running, so tests control exactly what the inventory
//! loop sees.

use crate::{
    HardwareError, Result,
    traits::TagSource,
    types::{InventoryParams, ReaderInfo},
};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tokio::sync::mpsc;
use tracing::debug;
use uhfscan_core::{ModuleKind, TagRecord};

/// State shared between the mock reader and its handle.
#[derive(Debug, Default)]
struct Shared {
    running: AtomicBool,
    fail_start: AtomicBool,
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
    reads_drained: AtomicUsize,
    last_params: Mutex<Option<InventoryParams>>,
}

/// Mock UHF reader for testing and development.
///
/// # Examples
///
/// ```
/// use uhfscan_core::{ModuleKind, TagRecord};
/// use uhfscan_hardware::TagSource;
/// use uhfscan_hardware::mock::MockTagSource;
///
/// let (source, handle) = MockTagSource::new(ModuleKind::Um);
///
/// handle.present(TagRecord::builder("E2801160", "3008").build().unwrap());
///
/// let record = source.read_next_tag().unwrap();
/// assert_eq!(record.tid(), "E2801160");
/// assert!(source.read_next_tag().is_none());
/// ```
#[derive(Debug)]
pub struct MockTagSource {
    /// Buffered records waiting to be drained
    buffer: Mutex<mpsc::UnboundedReceiver<TagRecord>>,

    /// Reader name
    name: String,

    /// Module family reported to consumers
    module: ModuleKind,

    shared: Arc<Shared>,
}

impl MockTagSource {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockTagSource, MockTagSourceHandle) where the
    /// handle is used to queue records and inspect reader calls.
    pub fn new(module: ModuleKind) -> (Self, MockTagSourceHandle) {
        Self::with_name("Mock UHF Reader", module)
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: impl Into<String>, module: ModuleKind) -> (Self, MockTagSourceHandle) {
        let (record_tx, record_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::default());

        let source = Self {
            buffer: Mutex::new(record_rx),
            name: name.into(),
            module,
            shared: Arc::clone(&shared),
        };

        let handle = MockTagSourceHandle { record_tx, shared };

        (source, handle)
    }
}

impl TagSource for MockTagSource {
    fn read_next_tag(&self) -> Option<TagRecord> {
        let record = self.buffer.lock().try_recv().ok()?;
        self.shared.reads_drained.fetch_add(1, Ordering::Relaxed);
        Some(record)
    }

    fn start_inventory(&self, params: &InventoryParams) -> Result<()> {
        self.shared.start_count.fetch_add(1, Ordering::Relaxed);
        if self.shared.fail_start.load(Ordering::Relaxed) {
            return Err(HardwareError::inventory_failed("mock reader refused to start"));
        }

        debug!(reader = %self.name, power = %params.power, "Mock inventory started");
        *self.shared.last_params.lock() = Some(params.clone());
        self.shared.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop_inventory(&self) -> bool {
        self.shared.stop_count.fetch_add(1, Ordering::Relaxed);
        let was_running = self.shared.running.swap(false, Ordering::AcqRel);
        debug!(reader = %self.name, was_running, "Mock inventory stopped");
        true
    }

    fn module(&self) -> ModuleKind {
        self.module
    }

    fn reader_info(&self) -> ReaderInfo {
        ReaderInfo::new(self.name.clone(), self.module).with_firmware_version("mock")
    }
}

/// Handle for controlling a mock reader.
///
/// Cloning the handle is cheap; every clone feeds the same buffer.
#[derive(Debug, Clone)]
pub struct MockTagSourceHandle {
    /// Channel sender feeding the reader buffer
    record_tx: mpsc::UnboundedSender<TagRecord>,

    shared: Arc<Shared>,
}

impl MockTagSourceHandle {
    /// Queue one record in the reader buffer.
    ///
    /// Returns `false` if the reader has been dropped.
    pub fn present(&self, record: TagRecord) -> bool {
        self.record_tx.send(record).is_ok()
    }

    /// Queue several records in order.
    ///
    /// Returns the number of records queued.
    pub fn present_many(&self, records: impl IntoIterator<Item = TagRecord>) -> usize {
        records
            .into_iter()
            .map(|record| self.present(record))
            .take_while(|queued| *queued)
            .count()
    }

    /// Make subsequent `start_inventory` calls fail.
    pub fn set_fail_start(&self, fail: bool) {
        self.shared.fail_start.store(fail, Ordering::Relaxed);
    }

    /// Whether an inventory round is currently running.
    pub fn is_inventory_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Number of `start_inventory` calls, successful or not.
    pub fn start_count(&self) -> usize {
        self.shared.start_count.load(Ordering::Relaxed)
    }

    /// Number of `stop_inventory` calls.
    pub fn stop_count(&self) -> usize {
        self.shared.stop_count.load(Ordering::Relaxed)
    }

    /// Number of records handed out by `read_next_tag`.
    pub fn reads_drained(&self) -> usize {
        self.shared.reads_drained.load(Ordering::Relaxed)
    }

    /// Parameters of the last successful `start_inventory` call.
    pub fn last_params(&self) -> Option<InventoryParams> {
        self.shared.last_params.lock().clone()
    }
}
