//! Common test utilities for engine integration tests.
//!
//! Every test runs the real polling thread against a
//! [`MockTagSource`](uhfscan_hardware::mock::MockTagSource), so assertions
//! wait on observable effects instead of sleeping for fixed periods where
//! possible.

#![allow(dead_code)]

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use uhfscan_core::{ModuleKind, TagRecord};
use uhfscan_engine::{EngineConfig, InventoryEngine};
use uhfscan_hardware::mock::{MockTagSource, MockTagSourceHandle};

/// Upper bound for any wait in these tests.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Start an engine over a fresh mock reader.
pub fn start_engine(module: ModuleKind) -> (InventoryEngine, MockTagSourceHandle) {
    start_engine_with(module, EngineConfig::default())
}

pub fn start_engine_with(
    module: ModuleKind,
    config: EngineConfig,
) -> (InventoryEngine, MockTagSourceHandle) {
    let (source, handle) = MockTagSource::new(module);
    let engine = InventoryEngine::new(Arc::new(source), config).unwrap();
    engine.start().unwrap();
    (engine, handle)
}

/// A record with a UM-style RSSI of -60 dBm.
pub fn tag(tid: &str) -> TagRecord {
    TagRecord::builder(tid, "30080000").rssi("FDA8").build().unwrap()
}

/// Poll `condition` until it holds or [`WAIT_TIMEOUT`] elapses.
pub fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
