//! Module-specific record decoding.
//!
//! Reader modules disagree on how signal strength is encoded: UM and RM
//! modules report a 4-digit hex word, SLR and GX modules a signed decimal
//! dBm value. Consumers pick a [`RecordDecoder`] once per session with
//! [`decoder_for`] instead of branching on the module for every record.
//!
//! # Proximity
//!
//! Locate screens show a proximity bar rather than raw dBm. Hex-RSSI modules
//! clamp the signal to `[-70, -29]` dBm and shift it onto a positive scale;
//! decimal modules use the distance from -70 dBm.
//!
//! ```
//! use uhfscan_core::ModuleKind;
//! use uhfscan_hardware::decoder_for;
//!
//! let decoder = decoder_for(ModuleKind::Um);
//! assert_eq!(decoder.rssi_dbm("FDA8").unwrap(), -60);
//! assert_eq!(decoder.proximity(-60), 11);
//! ```

use crate::error::{HardwareError, Result};
use std::fmt;
use uhfscan_core::{
    ModuleKind, TagRecord,
    constants::{RSSI_CLAMP_MAX_DBM, RSSI_CLAMP_MIN_DBM},
};

/// Decoded signal strength of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    /// Signal strength in dBm.
    pub dbm: i32,

    /// Non-negative proximity score, larger is closer.
    pub proximity: u32,
}

/// Strategy for decoding module-dependent record fields.
pub trait RecordDecoder: Send + Sync + fmt::Debug {
    /// Module family this decoder handles.
    fn module(&self) -> ModuleKind;

    /// Decode a raw RSSI field into dBm.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidRssi` if the field does not match the
    /// module's encoding.
    fn rssi_dbm(&self, raw: &str) -> Result<i32>;

    /// Map a dBm value onto the proximity scale.
    fn proximity(&self, dbm: i32) -> u32;

    /// Decode the signal of a record.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidRssi` if the RSSI field is malformed.
    fn signal(&self, record: &TagRecord) -> Result<Signal> {
        let dbm = self.rssi_dbm(record.rssi_raw())?;
        Ok(Signal {
            dbm,
            proximity: self.proximity(dbm),
        })
    }
}

/// Select the decoder for a module family.
pub fn decoder_for(module: ModuleKind) -> Box<dyn RecordDecoder> {
    match module {
        ModuleKind::Um | ModuleKind::Rm => Box::new(HexRssiDecoder::new(module, 1)),
        ModuleKind::Um510 => Box::new(HexRssiDecoder::new(module, 11)),
        ModuleKind::Slr | ModuleKind::Gx => Box::new(DecimalRssiDecoder { module }),
    }
}

/// Decoder for modules reporting RSSI as a hex word `HHLL`.
///
/// The word is a two's complement tenth-of-dBm value with the high byte
/// offset by one, so `FDA8` decodes to -60 dBm.
#[derive(Debug, Clone, Copy)]
pub struct HexRssiDecoder {
    module: ModuleKind,
    scale_offset: i32,
}

impl HexRssiDecoder {
    fn new(module: ModuleKind, scale_offset: i32) -> Self {
        Self {
            module,
            scale_offset,
        }
    }

    fn byte(&self, raw: &str, start: usize) -> Result<i32> {
        raw.get(start..start + 2)
            .and_then(|pair| i32::from_str_radix(pair, 16).ok())
            .ok_or_else(|| HardwareError::invalid_rssi(raw, self.module))
    }
}

impl RecordDecoder for HexRssiDecoder {
    fn module(&self) -> ModuleKind {
        self.module
    }

    fn rssi_dbm(&self, raw: &str) -> Result<i32> {
        let high = self.byte(raw, 0)?;
        let low = self.byte(raw, 2)?;
        Ok(((high - 256 + 1) * 256 + (low - 256)) / 10)
    }

    fn proximity(&self, dbm: i32) -> u32 {
        let clamped = dbm.clamp(RSSI_CLAMP_MIN_DBM, RSSI_CLAMP_MAX_DBM);
        (clamped - (RSSI_CLAMP_MIN_DBM - self.scale_offset)).unsigned_abs()
    }
}

/// Decoder for modules reporting RSSI as signed decimal dBm.
#[derive(Debug, Clone, Copy)]
pub struct DecimalRssiDecoder {
    module: ModuleKind,
}

impl RecordDecoder for DecimalRssiDecoder {
    fn module(&self) -> ModuleKind {
        self.module
    }

    fn rssi_dbm(&self, raw: &str) -> Result<i32> {
        raw.trim()
            .parse()
            .map_err(|_| HardwareError::invalid_rssi(raw, self.module))
    }

    fn proximity(&self, dbm: i32) -> u32 {
        dbm.saturating_sub(RSSI_CLAMP_MIN_DBM).unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("FDA8", -60)]
    #[case("FF9C", -10)]
    #[case("FD44", -70)]
    #[case("fda8", -60)]
    fn test_hex_rssi(#[case] raw: &str, #[case] expected: i32) {
        let decoder = decoder_for(ModuleKind::Um);
        assert_eq!(decoder.rssi_dbm(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("FD")]
    #[case("XYZW")]
    fn test_hex_rssi_malformed(#[case] raw: &str) {
        let decoder = decoder_for(ModuleKind::Rm);
        assert!(matches!(
            decoder.rssi_dbm(raw),
            Err(HardwareError::InvalidRssi { .. })
        ));
    }

    #[rstest]
    #[case(ModuleKind::Um, -60, 11)]
    #[case(ModuleKind::Um, -90, 1)]
    #[case(ModuleKind::Um, -10, 42)]
    #[case(ModuleKind::Um510, -60, 21)]
    #[case(ModuleKind::Um510, -90, 11)]
    #[case(ModuleKind::Slr, -61, 9)]
    #[case(ModuleKind::Slr, -70, 0)]
    #[case(ModuleKind::Gx, -80, 10)]
    #[case(ModuleKind::Slr, i32::MAX, i32::MAX.unsigned_abs())]
    #[case(ModuleKind::Slr, i32::MIN, i32::MIN.saturating_sub(-70).unsigned_abs())]
    #[case(ModuleKind::Um, i32::MIN, 1)]
    fn test_proximity(#[case] module: ModuleKind, #[case] dbm: i32, #[case] expected: u32) {
        assert_eq!(decoder_for(module).proximity(dbm), expected);
    }

    #[test]
    fn test_decimal_rssi() {
        let decoder = decoder_for(ModuleKind::Slr);
        assert_eq!(decoder.rssi_dbm("-61").unwrap(), -61);
        assert_eq!(decoder.rssi_dbm(" -45 ").unwrap(), -45);
        assert!(decoder.rssi_dbm("FDA8").is_err());
    }

    #[test]
    fn test_signal_from_record() {
        let record = TagRecord::builder("E280", "3008")
            .rssi("FDA8")
            .build()
            .unwrap();
        let signal = decoder_for(ModuleKind::Um).signal(&record).unwrap();
        assert_eq!(
            signal,
            Signal {
                dbm: -60,
                proximity: 11
            }
        );
    }

    #[test]
    fn test_decimal_signal_out_of_range() {
        let record = TagRecord::builder("E280", "3008")
            .rssi("2147483647")
            .build()
            .unwrap();
        let signal = decoder_for(ModuleKind::Slr).signal(&record).unwrap();
        assert_eq!(signal.dbm, i32::MAX);
        assert_eq!(signal.proximity, i32::MAX as u32);
    }

    #[test]
    fn test_decoder_module() {
        for module in [
            ModuleKind::Um,
            ModuleKind::Um510,
            ModuleKind::Rm,
            ModuleKind::Slr,
            ModuleKind::Gx,
        ] {
            assert_eq!(decoder_for(module).module(), module);
        }
    }
}
