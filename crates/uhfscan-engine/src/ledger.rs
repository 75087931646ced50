//! Deduplicating tag ledger.
//!
//! The ledger counts observations per dedup key and keeps one display row
//! per distinct tag in first-seen order. Counts and rows are cleared
//! together, so the tag count and the displayed list never disagree.
//!
//! The ledger has no notion of [`DataTypeView`](uhfscan_core::DataTypeView):
//! keys are derived by the caller, which must clear the ledger when the view
//! changes.

use std::collections::HashMap;
use uhfscan_core::TagFields;

/// One displayed tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRow {
    /// Fields as displayed, including the dedup key.
    pub fields: TagFields,

    /// Times this tag has been observed.
    pub count: u32,

    /// Latest signal strength in dBm, if decoded.
    pub rssi_dbm: Option<i32>,

    /// Latest chip temperature, for modules that report one.
    pub temperature: Option<i32>,
}

impl TagRow {
    /// Create a row for a first sighting.
    pub fn new(fields: TagFields) -> Self {
        Self {
            fields,
            count: 1,
            rssi_dbm: None,
            temperature: None,
        }
    }

    pub fn with_rssi(mut self, rssi_dbm: Option<i32>) -> Self {
        self.rssi_dbm = rssi_dbm;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<i32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn key(&self) -> &str {
        &self.fields.key
    }
}

/// Outcome of recording a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First sighting; the row was appended at `index`.
    New { index: usize },

    /// Repeat sighting of the row at `index`, now seen `count` times.
    Repeat { index: usize, count: u32 },
}

impl Observation {
    pub fn index(&self) -> usize {
        match self {
            Self::New { index } | Self::Repeat { index, .. } => *index,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::New { .. })
    }
}

/// Per-key observation counts plus encounter-ordered display rows.
///
/// # Examples
///
/// ```
/// use uhfscan_engine::DedupLedger;
///
/// let mut ledger = DedupLedger::new();
/// for key in ["A", "A", "B", "A"] {
///     ledger.observe(key);
/// }
///
/// assert_eq!(ledger.count("A"), 3);
/// assert_eq!(ledger.count("B"), 1);
/// assert_eq!(ledger.keys().collect::<Vec<_>>(), ["A", "B"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DedupLedger {
    counts: HashMap<String, u32>,
    order: Vec<String>,
    rows: Vec<TagRow>,
    positions: HashMap<String, usize>,
    total: u64,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one observation of `key` and return its new count.
    pub fn observe(&mut self, key: &str) -> u32 {
        self.total += 1;
        if let Some(count) = self.counts.get_mut(key) {
            *count = count.saturating_add(1);
            return *count;
        }
        self.counts.insert(key.to_string(), 1);
        self.order.push(key.to_string());
        1
    }

    /// Observe a row's key, appending the row on first sight.
    ///
    /// On a repeat the stored row keeps its first-seen fields and takes the
    /// latest signal strength and temperature.
    pub fn record(&mut self, row: TagRow) -> Observation {
        let count = self.observe(row.key());

        if let Some(&index) = self.positions.get(row.key()) {
            if let Some(existing) = self.rows.get_mut(index) {
                existing.count = count;
                existing.rssi_dbm = row.rssi_dbm.or(existing.rssi_dbm);
                existing.temperature = row.temperature.or(existing.temperature);
            }
            return Observation::Repeat { index, count };
        }

        let index = self.rows.len();
        self.positions.insert(row.key().to_string(), index);
        self.rows.push(TagRow { count, ..row });
        if count == 1 {
            Observation::New { index }
        } else {
            Observation::Repeat { index, count }
        }
    }

    /// Empty counts and rows together.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.order.clear();
        self.rows.clear();
        self.positions.clear();
        self.total = 0;
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Observations of `key`, zero if never seen.
    pub fn count(&self, key: &str) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Display rows in first-seen order.
    pub fn rows(&self) -> &[TagRow] {
        &self.rows
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Observations across all keys.
    pub fn total_reads(&self) -> u64 {
        self.total
    }
}
