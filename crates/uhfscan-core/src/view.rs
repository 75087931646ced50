//! Data-type views and dedup key derivation.
//!
//! The reader can be configured to return different memory banks alongside
//! the EPC. The selected view decides how the combined payload carried in a
//! record's `tid` field is split into TID, USR and RFU segments, and which
//! field identifies a physical tag for deduplication.
//!
//! | View | Code | Split | Dedup key |
//! |------|------|-------|-----------|
//! | `Epc` | 0 | none | EPC |
//! | `Tid` | 1 | none | TID |
//! | `EpcTid` | 2 | none | TID |
//! | `EpcUsr` | 3 | payload is USR | EPC |
//! | `EpcTidUsr` | 4 | TID = `[0..24]`, USR = `[24..]` | TID |
//! | `EpcTidRfu` | 5 | TID = `[0..24]`, RFU = `[24..len-2]` | TID |
//! | `EpcRfu` | 6 | payload is RFU | EPC |
//!
//! EPCs are not guaranteed unique (some deployments write the same EPC to
//! many tags), so every view that reads the TID keys on it.

use crate::{
    Result, TagRecord,
    constants::{RFU_TRAILER_HEX_LEN, TID_PAYLOAD_HEX_LEN},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which memory banks the reader returns and how they are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTypeView {
    /// EPC only.
    #[default]
    Epc,

    /// TID only.
    Tid,

    /// EPC and TID.
    EpcTid,

    /// EPC and user memory.
    EpcUsr,

    /// EPC, TID and user memory in one payload.
    EpcTidUsr,

    /// EPC, TID and reserved memory in one payload.
    EpcTidRfu,

    /// EPC and reserved memory.
    EpcRfu,
}

impl DataTypeView {
    /// Numeric code used by the reader settings screen.
    pub fn code(&self) -> u8 {
        match self {
            Self::Epc => 0,
            Self::Tid => 1,
            Self::EpcTid => 2,
            Self::EpcUsr => 3,
            Self::EpcTidUsr => 4,
            Self::EpcTidRfu => 5,
            Self::EpcRfu => 6,
        }
    }

    /// Create a view from its numeric code.
    ///
    /// # Errors
    /// Returns `Error::InvalidDataType` for codes above 6.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Epc),
            1 => Ok(Self::Tid),
            2 => Ok(Self::EpcTid),
            3 => Ok(Self::EpcUsr),
            4 => Ok(Self::EpcTidUsr),
            5 => Ok(Self::EpcTidRfu),
            6 => Ok(Self::EpcRfu),
            other => Err(Error::InvalidDataType(other.to_string())),
        }
    }

    /// Whether tags are deduplicated by TID rather than EPC.
    pub fn keyed_by_tid(&self) -> bool {
        matches!(
            self,
            Self::Tid | Self::EpcTid | Self::EpcTidUsr | Self::EpcTidRfu
        )
    }

    /// Split a record into display fields and derive its dedup key.
    ///
    /// # Errors
    /// Returns `Error::InvalidRecord` if the payload is too short for the
    /// view's fixed offsets, or if the field the view keys on is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use uhfscan_core::{DataTypeView, TagRecord};
    ///
    /// let record = TagRecord::builder("E2801160200074CF085C0A2B1234", "3008").build().unwrap();
    /// let fields = DataTypeView::EpcTidUsr.split(&record).unwrap();
    ///
    /// assert_eq!(fields.tid, "E2801160200074CF085C0A2B");
    /// assert_eq!(fields.usr.as_deref(), Some("1234"));
    /// assert_eq!(fields.key, fields.tid);
    /// ```
    pub fn split(&self, record: &TagRecord) -> Result<TagFields> {
        let payload = record.tid();
        let (tid, usr, rfu) = match self {
            Self::Epc | Self::Tid | Self::EpcTid => (payload.to_string(), None, None),
            Self::EpcUsr => (payload.to_string(), Some(payload.to_string()), None),
            Self::EpcRfu => (payload.to_string(), None, Some(payload.to_string())),
            Self::EpcTidUsr => {
                let tid = segment(payload, 0, TID_PAYLOAD_HEX_LEN, *self)?;
                let usr = segment(payload, TID_PAYLOAD_HEX_LEN, payload.len(), *self)?;
                (tid.to_string(), Some(usr.to_string()), None)
            }
            Self::EpcTidRfu => {
                let end = payload
                    .len()
                    .checked_sub(RFU_TRAILER_HEX_LEN)
                    .filter(|end| *end >= TID_PAYLOAD_HEX_LEN)
                    .ok_or_else(|| too_short(payload, *self))?;
                let tid = segment(payload, 0, TID_PAYLOAD_HEX_LEN, *self)?;
                let rfu = segment(payload, TID_PAYLOAD_HEX_LEN, end, *self)?;
                (tid.to_string(), None, Some(rfu.to_string()))
            }
        };

        let key = if self.keyed_by_tid() {
            tid.clone()
        } else {
            record.epc().to_string()
        };
        if key.is_empty() {
            return Err(Error::InvalidRecord(format!(
                "empty dedup key for view {self}"
            )));
        }

        Ok(TagFields {
            key,
            kind: record.kind().to_string(),
            tid,
            epc: record.epc().to_string(),
            usr,
            rfu,
        })
    }
}

fn segment(payload: &str, start: usize, end: usize, view: DataTypeView) -> Result<&str> {
    payload
        .get(start..end)
        .ok_or_else(|| too_short(payload, view))
}

fn too_short(payload: &str, view: DataTypeView) -> Error {
    Error::InvalidRecord(format!(
        "payload of {} chars too short for view {view}",
        payload.len()
    ))
}

impl fmt::Display for DataTypeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Epc => "epc",
            Self::Tid => "tid",
            Self::EpcTid => "epc+tid",
            Self::EpcUsr => "epc+usr",
            Self::EpcTidUsr => "epc+tid+usr",
            Self::EpcTidRfu => "epc+tid+rfu",
            Self::EpcRfu => "epc+rfu",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for DataTypeView {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], "+");
        match normalized.as_str() {
            "epc" => Ok(Self::Epc),
            "tid" => Ok(Self::Tid),
            "epc+tid" => Ok(Self::EpcTid),
            "epc+usr" => Ok(Self::EpcUsr),
            "epc+tid+usr" => Ok(Self::EpcTidUsr),
            "epc+tid+rfu" => Ok(Self::EpcTidRfu),
            "epc+rfu" => Ok(Self::EpcRfu),
            _ => match s.trim().parse::<u8>() {
                Ok(code) => Self::from_code(code),
                Err(_) => Err(Error::InvalidDataType(s.to_string())),
            },
        }
    }
}

/// Display fields derived from one record under a [`DataTypeView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFields {
    /// Identifier used for deduplication.
    pub key: String,

    /// Bank/type descriptor.
    pub kind: String,

    /// TID segment.
    pub tid: String,

    /// EPC.
    pub epc: String,

    /// User memory segment, for views that read it.
    pub usr: Option<String>,

    /// Reserved memory segment, for views that read it.
    pub rfu: Option<String>,
}

impl TagFields {
    /// Convert the displayed segments from hex to ASCII text.
    ///
    /// The dedup key is left untouched so that switching the display
    /// encoding never merges or splits ledger entries.
    ///
    /// # Errors
    /// Returns `Error::InvalidHex` if a segment is not valid hex.
    pub fn into_ascii(self) -> Result<Self> {
        Ok(Self {
            key: self.key,
            kind: self.kind,
            tid: hex_to_ascii(&self.tid)?,
            epc: hex_to_ascii(&self.epc)?,
            usr: self.usr.as_deref().map(hex_to_ascii).transpose()?,
            rfu: self.rfu.as_deref().map(hex_to_ascii).transpose()?,
        })
    }
}

/// Decode a hex string into text, one character per byte.
///
/// A trailing odd nibble is ignored.
///
/// # Errors
/// Returns `Error::InvalidHex` if a byte pair is not valid hex.
///
/// # Examples
///
/// ```
/// use uhfscan_core::hex_to_ascii;
///
/// assert_eq!(hex_to_ascii("49204C6F7665").unwrap(), "I Love");
/// ```
pub fn hex_to_ascii(hex: &str) -> Result<String> {
    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .map(char::from)
                .ok_or_else(|| Error::InvalidHex(hex.to_string()))
        })
        .collect()
}
