//! Decoded tag records produced by the reader driver.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One decoded tag detection, as drained from the reader buffer.
///
/// Records are immutable once built. The encoding of `rssi_raw` (hex or
/// decimal) and the presence of `temperature` depend on the reader module
/// and stay fixed for a session; decoding them is the consumer's job.
///
/// # Examples
///
/// ```
/// use uhfscan_core::TagRecord;
///
/// let record = TagRecord::builder("E2801160200074CF085C0A2B", "300833B2DDD9014000000000")
///     .kind("6C")
///     .rssi("FDA8")
///     .build()
///     .unwrap();
///
/// assert_eq!(record.epc(), "300833B2DDD9014000000000");
/// assert_eq!(record.temperature(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    kind: String,
    tid: String,
    epc: String,
    rssi_raw: String,
    temperature: Option<i32>,
    read_at: DateTime<Utc>,
}

impl TagRecord {
    /// Create a record stamped with the current time.
    ///
    /// # Errors
    /// Returns `Error::InvalidRecord` if both `tid` and `epc` are empty.
    pub fn new(
        kind: impl Into<String>,
        tid: impl Into<String>,
        epc: impl Into<String>,
        rssi_raw: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(tid, epc).kind(kind).rssi(rssi_raw).build()
    }

    /// Start building a record from its identifying fields.
    pub fn builder(tid: impl Into<String>, epc: impl Into<String>) -> TagRecordBuilder {
        TagRecordBuilder::new(tid, epc)
    }

    /// Bank or type descriptor reported by the module.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Hex TID, or the combined TID+USR/RFU payload for split views.
    pub fn tid(&self) -> &str {
        &self.tid
    }

    /// Hex EPC payload.
    pub fn epc(&self) -> &str {
        &self.epc
    }

    /// Signal strength exactly as the module reported it.
    pub fn rssi_raw(&self) -> &str {
        &self.rssi_raw
    }

    /// Chip temperature in degrees Celsius, for modules that report it.
    pub fn temperature(&self) -> Option<i32> {
        self.temperature
    }

    /// When the record was drained from the buffer.
    pub fn read_at(&self) -> DateTime<Utc> {
        self.read_at
    }

    /// Check whether the TID starts with the given prefix, ignoring ASCII
    /// case.
    ///
    /// Used by custom read filters that only accept one tag family.
    pub fn tid_has_prefix(&self, prefix: &str) -> bool {
        self.tid
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }
}

/// Builder for [`TagRecord`].
///
/// Allows setting optional fields and a custom timestamp, which is handy
/// for tests and for replaying captured sessions.
#[derive(Debug, Clone)]
pub struct TagRecordBuilder {
    kind: String,
    tid: String,
    epc: String,
    rssi_raw: String,
    temperature: Option<i32>,
    read_at: Option<DateTime<Utc>>,
}

impl TagRecordBuilder {
    fn new(tid: impl Into<String>, epc: impl Into<String>) -> Self {
        Self {
            kind: String::new(),
            tid: tid.into(),
            epc: epc.into(),
            rssi_raw: String::new(),
            temperature: None,
            read_at: None,
        }
    }

    /// Set the bank/type descriptor.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the raw signal strength.
    pub fn rssi(mut self, rssi_raw: impl Into<String>) -> Self {
        self.rssi_raw = rssi_raw.into();
        self
    }

    /// Set the reported chip temperature.
    pub fn temperature(mut self, celsius: i32) -> Self {
        self.temperature = Some(celsius);
        self
    }

    /// Override the capture timestamp.
    pub fn read_at(mut self, read_at: DateTime<Utc>) -> Self {
        self.read_at = Some(read_at);
        self
    }

    /// Build the record.
    ///
    /// # Errors
    /// Returns `Error::InvalidRecord` if both `tid` and `epc` are empty.
    pub fn build(self) -> Result<TagRecord> {
        if self.tid.is_empty() && self.epc.is_empty() {
            return Err(Error::InvalidRecord(
                "TID and EPC cannot both be empty".to_string(),
            ));
        }

        Ok(TagRecord {
            kind: self.kind,
            tid: self.tid,
            epc: self.epc,
            rssi_raw: self.rssi_raw,
            temperature: self.temperature,
            read_at: self.read_at.unwrap_or_else(Utc::now),
        })
    }
}
