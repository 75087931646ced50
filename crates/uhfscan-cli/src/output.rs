//! Terminal rendering of session updates.

use std::io::Write;
use uhfscan_engine::{
    SoundPlayer, TagRow,
    session::{InventorySummary, InventoryUpdate, LocateUpdate, LockReadUpdate},
};

/// Width of the locate proximity bar.
const BAR_WIDTH: u32 = 45;

/// Rings the terminal bell on stderr.
#[derive(Debug, Clone, Copy)]
pub struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&self) {
        let mut stderr = std::io::stderr();
        // A missing terminal is not worth failing a scan over.
        let _ = stderr.write_all(b"\x07").and_then(|()| stderr.flush());
    }
}

pub fn inventory_update(update: &InventoryUpdate) {
    match update {
        InventoryUpdate::NewTag {
            index,
            row,
            unique,
            total,
        } => {
            println!("{:>4}  {}  (unique {unique}, reads {total})", index + 1, describe(row));
        }
        InventoryUpdate::Repeat { .. } => {}
        InventoryUpdate::Rate { reads, elapsed } => {
            println!("      {reads} reads/s at {:.1}s", elapsed.as_secs_f64());
        }
        InventoryUpdate::Lost => println!("      no tags in range"),
        InventoryUpdate::Ended(summary) => println!("      auto-stop: {}", totals(summary)),
    }
}

pub fn inventory_table(rows: &[TagRow], summary: &InventorySummary) {
    println!();
    println!("{:>4}  {:<34}  {:>6}  {:>5}", "#", "key", "count", "dBm");
    for (index, row) in rows.iter().enumerate() {
        let rssi = row
            .rssi_dbm
            .map_or_else(|| "-".to_string(), |dbm| dbm.to_string());
        println!(
            "{:>4}  {:<34}  {:>6}  {:>5}",
            index + 1,
            row.key(),
            row.count,
            rssi
        );
    }
    println!("{}", totals(summary));
}

pub fn locate_update(update: &LocateUpdate) {
    match update {
        LocateUpdate::Signal {
            epc,
            dbm,
            proximity,
        } => {
            let filled = (*proximity).min(BAR_WIDTH) as usize;
            let bar = format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH as usize - filled));
            println!("{epc}  [{bar}]  {dbm:>4} dBm");
        }
        LocateUpdate::Lost => println!("tag lost"),
    }
}

pub fn lock_read_update(update: &LockReadUpdate) {
    match update {
        LockReadUpdate::Tag(record) => {
            println!(
                "{}  tid={}  epc={}  rssi={}",
                record.read_at().format("%H:%M:%S%.3f"),
                record.tid(),
                record.epc(),
                record.rssi_raw()
            );
        }
    }
}

fn describe(row: &TagRow) -> String {
    let fields = &row.fields;
    let mut text = format!("epc={} tid={}", fields.epc, fields.tid);
    if let Some(usr) = &fields.usr {
        text.push_str(&format!(" usr={usr}"));
    }
    if let Some(rfu) = &fields.rfu {
        text.push_str(&format!(" rfu={rfu}"));
    }
    if let Some(celsius) = row.temperature {
        text.push_str(&format!(" temp={celsius}C"));
    }
    text
}

fn totals(summary: &InventorySummary) -> String {
    format!(
        "{} tags, {} reads in {:.1}s",
        summary.unique,
        summary.total,
        summary.elapsed.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uhfscan_core::TagFields;

    #[test]
    fn test_describe_optional_fields() {
        let row = TagRow::new(TagFields {
            key: "E280".to_string(),
            kind: "6C".to_string(),
            tid: "E280".to_string(),
            epc: "3008".to_string(),
            usr: Some("1234".to_string()),
            rfu: None,
        })
        .with_temperature(Some(27));

        assert_eq!(describe(&row), "epc=3008 tid=E280 usr=1234 temp=27C");
    }

    #[test]
    fn test_totals() {
        let summary = InventorySummary {
            unique: 3,
            total: 42,
            elapsed: Duration::from_millis(2500),
        };
        assert_eq!(totals(&summary), "3 tags, 42 reads in 2.5s");
    }
}
