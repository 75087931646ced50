//! Continuous inventory session.

use crate::{
    beeper::TagPresence,
    ledger::{DedupLedger, Observation, TagRow},
    sink::ResultSink,
};
use parking_lot::Mutex;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uhfscan_core::{DataTypeView, ModuleKind, TagRecord};
use uhfscan_hardware::{RecordDecoder, decoder_for};

/// Update produced by an [`InventorySession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryUpdate {
    /// A tag was seen for the first time and appended at `index`.
    NewTag {
        index: usize,
        row: TagRow,
        unique: usize,
        total: u64,
    },

    /// A known tag was seen again.
    Repeat {
        index: usize,
        count: u32,
        rssi_dbm: Option<i32>,
        total: u64,
    },

    /// A rate window closed.
    Rate { reads: u64, elapsed: Duration },

    /// The engine reported silence.
    Lost,

    /// The engine ended the session on its own.
    Ended(InventorySummary),
}

/// Totals of an inventory session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventorySummary {
    /// Distinct tags.
    pub unique: usize,

    /// Accepted reads.
    pub total: u64,

    /// Time since the first engine callback after creation or the last
    /// clear.
    pub elapsed: Duration,
}

/// Deduplicating tag list for the inventory screen.
///
/// # Examples
///
/// ```
/// use uhfscan_core::{DataTypeView, ModuleKind, TagRecord};
/// use uhfscan_engine::ResultSink;
/// use uhfscan_engine::session::{InventorySession, InventoryUpdate};
///
/// let (session, mut updates) = InventorySession::new(DataTypeView::Tid, ModuleKind::Um);
/// let record = TagRecord::builder("E2801160", "3008").rssi("FDA8").build().unwrap();
///
/// session.on_tag(&record);
/// session.on_tag(&record);
///
/// assert!(matches!(updates.try_recv(), Ok(InventoryUpdate::NewTag { index: 0, .. })));
/// assert!(matches!(updates.try_recv(), Ok(InventoryUpdate::Repeat { count: 2, .. })));
/// assert_eq!(session.summary().unique, 1);
/// ```
pub struct InventorySession {
    view: DataTypeView,
    ascii_display: bool,
    decoder: Box<dyn RecordDecoder>,
    ledger: Mutex<DedupLedger>,
    started: Mutex<Option<Instant>>,
    presence: Option<Arc<TagPresence>>,
    updates: mpsc::UnboundedSender<InventoryUpdate>,
}

impl InventorySession {
    /// Create a session and the receiver for its updates.
    pub fn new(
        view: DataTypeView,
        module: ModuleKind,
    ) -> (Self, mpsc::UnboundedReceiver<InventoryUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let session = Self {
            view,
            ascii_display: false,
            decoder: decoder_for(module),
            ledger: Mutex::new(DedupLedger::new()),
            started: Mutex::new(None),
            presence: None,
            updates,
        };
        (session, rx)
    }

    /// Display tag fields as ASCII text instead of hex.
    ///
    /// Deduplication still uses the hex key.
    pub fn with_ascii_display(mut self, enabled: bool) -> Self {
        self.ascii_display = enabled;
        self
    }

    /// Mark `presence` on every accepted tag, for audio feedback.
    pub fn with_presence(mut self, presence: Arc<TagPresence>) -> Self {
        self.presence = Some(presence);
        self
    }

    pub fn view(&self) -> DataTypeView {
        self.view
    }

    /// Displayed rows in first-seen order.
    ///
    /// Safe to call from any thread; the snapshot is taken under the same
    /// lock the engine thread records into.
    pub fn rows(&self) -> Vec<TagRow> {
        self.ledger.lock().rows().to_vec()
    }

    pub fn summary(&self) -> InventorySummary {
        let ledger = self.ledger.lock();
        InventorySummary {
            unique: ledger.len(),
            total: ledger.total_reads(),
            elapsed: self.elapsed(),
        }
    }

    /// Empty the tag list and restart the scan clock.
    ///
    /// This is the one ledger mutation made off the engine thread. The
    /// ledger lock serializes it with callbacks in flight, so a read is
    /// either counted before the clear or after it, never half-applied.
    /// The clock restarts on the next engine callback.
    pub fn clear(&self) {
        self.ledger.lock().clear();
        *self.started.lock() = None;
        if let Some(presence) = &self.presence {
            presence.clear();
        }
        info!(view = %self.view, "Inventory cleared");
    }

    fn elapsed(&self) -> Duration {
        self.started.lock().map_or(Duration::ZERO, |at| at.elapsed())
    }

    /// Start the scan clock on the first callback of a scan.
    fn touch_clock(&self) {
        self.started.lock().get_or_insert_with(Instant::now);
    }

    fn row_for(&self, record: &TagRecord) -> Option<TagRow> {
        let fields = match self.view.split(record) {
            Ok(fields) => fields,
            Err(e) => {
                debug!(error = %e, "Malformed record dropped");
                return None;
            }
        };

        let fields = if self.ascii_display {
            match fields.clone().into_ascii() {
                Ok(ascii) => ascii,
                Err(e) => {
                    debug!(error = %e, "Keeping hex display");
                    fields
                }
            }
        } else {
            fields
        };

        let temperature = record
            .temperature()
            .filter(|_| self.decoder.module().reports_temperature());

        Some(
            TagRow::new(fields)
                .with_rssi(self.decoder.rssi_dbm(record.rssi_raw()).ok())
                .with_temperature(temperature),
        )
    }
}

impl ResultSink for InventorySession {
    fn on_tag(&self, record: &TagRecord) {
        self.touch_clock();
        let Some(row) = self.row_for(record) else {
            return;
        };
        if let Some(presence) = &self.presence {
            presence.mark();
        }

        let update = {
            let mut ledger = self.ledger.lock();
            let rssi_dbm = row.rssi_dbm;
            let observation = ledger.record(row);
            let total = ledger.total_reads();
            match observation {
                Observation::New { index } => {
                    ledger
                        .rows()
                        .get(index)
                        .cloned()
                        .map(|row| InventoryUpdate::NewTag {
                            index,
                            row,
                            unique: ledger.len(),
                            total,
                        })
                }
                Observation::Repeat { index, count } => Some(InventoryUpdate::Repeat {
                    index,
                    count,
                    rssi_dbm,
                    total,
                }),
            }
        };
        if let Some(update) = update {
            super::forward(&self.updates, update);
        }
    }

    fn on_rate(&self, reads: u64) {
        self.touch_clock();
        super::forward(
            &self.updates,
            InventoryUpdate::Rate {
                reads,
                elapsed: self.elapsed(),
            },
        );
    }

    fn on_tag_lost(&self) {
        super::forward(&self.updates, InventoryUpdate::Lost);
    }

    fn on_session_end(&self) {
        let summary = self.summary();
        info!(
            unique = summary.unique,
            total = summary.total,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Inventory session ended"
        );
        super::forward(&self.updates, InventoryUpdate::Ended(summary));
    }
}
