//! Simulated tag field feeding a mock reader.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use uhfscan_core::{ModuleKind, TagRecord};
use uhfscan_hardware::mock::MockTagSourceHandle;

/// A fixed population of tags in front of the antenna.
#[derive(Debug, Clone)]
pub struct TagField {
    module: ModuleKind,
    tags: Vec<(String, String)>,
}

impl TagField {
    /// `count` distinct tags. Each TID payload carries a 24-character TID,
    /// 8 characters of user memory and a 2-character trailer, so every data
    /// type view can split it.
    pub fn new(module: ModuleKind, count: usize) -> Self {
        let tags = (0..count.max(1))
            .map(|i| {
                let tid = format!("E2801160{i:016X}{:08X}00", 0x5553_0000 + i);
                let epc = format!("3008{i:020X}");
                (tid, epc)
            })
            .collect();
        Self { module, tags }
    }

    /// The record seen on the `tick`-th read.
    ///
    /// Tags take turns and their signal drifts between -70 and -31 dBm.
    pub fn record(&self, tick: u64) -> anyhow::Result<TagRecord> {
        let slot = (tick % self.tags.len() as u64) as usize;
        let (tid, epc) = &self.tags[slot];
        let dbm = -70 + ((tick * 7 + slot as u64 * 13) % 40) as i32;

        let mut builder = TagRecord::builder(tid.as_str(), epc.as_str())
            .kind("6C")
            .rssi(encode_rssi(self.module, dbm));
        if self.module.reports_temperature() {
            builder = builder.temperature(25 + (tick % 5) as i32);
        }
        Ok(builder.build()?)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

/// Encode `dbm` the way the module reports it.
pub fn encode_rssi(module: ModuleKind, dbm: i32) -> String {
    if module.has_hex_rssi() {
        // Tenths of a dBm as a 16-bit two's complement word.
        format!("{:04X}", (dbm * 10) as i16 as u16)
    } else {
        dbm.to_string()
    }
}

/// Present one record from `field` every `interval` until aborted.
pub fn spawn_producer(
    field: TagField,
    handle: MockTagSourceHandle,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        let mut tick = 0u64;
        loop {
            ticker.tick().await;
            match field.record(tick) {
                Ok(record) => {
                    if !handle.present(record) {
                        debug!("Reader gone; producer exiting");
                        return;
                    }
                }
                Err(e) => debug!(error = %e, "Skipping simulated read"),
            }
            tick += 1;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uhfscan_core::DataTypeView;
    use uhfscan_hardware::decoder_for;

    #[rstest]
    #[case(ModuleKind::Um, -60, "FDA8")]
    #[case(ModuleKind::Rm, -10, "FF9C")]
    #[case(ModuleKind::Slr, -61, "-61")]
    fn test_encode_rssi(#[case] module: ModuleKind, #[case] dbm: i32, #[case] expected: &str) {
        assert_eq!(encode_rssi(module, dbm), expected);
        assert_eq!(decoder_for(module).rssi_dbm(expected).unwrap(), dbm);
    }

    #[test]
    fn test_field_cycles_tags() {
        let field = TagField::new(ModuleKind::Um, 3);
        let first = field.record(0).unwrap();
        let again = field.record(3).unwrap();
        assert_eq!(first.tid(), again.tid());
        assert_ne!(first.tid(), field.record(1).unwrap().tid());
    }

    #[test]
    fn test_field_payload_splits_for_every_view() {
        let field = TagField::new(ModuleKind::Rm, 2);
        let record = field.record(1).unwrap();
        assert_eq!(record.tid().len(), 34);
        assert!(record.temperature().is_some());

        for code in 0..=6 {
            let view = DataTypeView::from_code(code).unwrap();
            assert!(view.split(&record).is_ok(), "view {view} failed");
        }
    }

    #[test]
    fn test_empty_field_has_one_tag() {
        assert_eq!(TagField::new(ModuleKind::Gx, 0).len(), 1);
    }
}
