//! Background tag-inventory engine for handheld UHF readers.
//!
//! The engine owns one polling thread that drains a [`TagSource`] and
//! reports to whichever [`ResultSink`] the current screen registered. The
//! screen's [`OperatingMode`] decides what happens to each record:
//!
//! - **Continuous inventory**: power and prefix gates, per-second read
//!   rate, every accepted record forwarded.
//! - **Locate**: the same gates, plus a one-shot notification when the
//!   tag goes silent.
//! - **Lock/read**: records forwarded as-is.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use uhfscan_core::{DataTypeView, ModuleKind, OperatingMode};
//! use uhfscan_engine::{EngineConfig, InventoryEngine, session::InventorySession};
//! use uhfscan_hardware::{InventoryParams, mock::MockTagSource};
//!
//! # fn main() -> uhfscan_engine::Result<()> {
//! let (source, _handle) = MockTagSource::new(ModuleKind::Um);
//! let engine = InventoryEngine::new(Arc::new(source), EngineConfig::default())?;
//! engine.start()?;
//!
//! let (session, _updates) = InventorySession::new(DataTypeView::Epc, ModuleKind::Um);
//! engine.begin_session(
//!     OperatingMode::ContinuousInventory,
//!     Arc::new(session),
//!     &InventoryParams::default(),
//! )?;
//!
//! engine.end_session();
//! # Ok(())
//! # }
//! ```
//!
//! [`TagSource`]: uhfscan_hardware::TagSource
//! [`OperatingMode`]: uhfscan_core::OperatingMode

pub mod beeper;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod mock;
pub mod quiescence;
pub mod rate;
pub mod session;
pub mod sink;

pub use beeper::{
    BeeperConfig, BeeperHandle, FeedbackBeeper, ProximityCadence, SoundPlayer, TagPresence,
};
pub use config::EngineConfig;
pub use engine::{INVENTORY_THREAD_NAME, InventoryEngine};
pub use error::{EngineError, Result};
pub use ledger::{DedupLedger, Observation, TagRow};
pub use quiescence::QuiescenceDetector;
pub use rate::RateCounter;
pub use sink::{Binding, ResultSink, SinkSlot};
