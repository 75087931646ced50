//! Reader abstraction layer for the uhfscan inventory engine.
//!
//! This crate sits between the inventory engine and a vendor UHF reader
//! driver. It defines the [`TagSource`] trait the engine drains records
//! from, the parameters used to start an inventory round, and the
//! module-specific decoding of signal strength.
//!
//! # Design
//!
//! - **Non-blocking**: the engine polls the reader buffer from a dedicated
//!   thread, so [`TagSource`] methods are plain synchronous calls that never
//!   wait for hardware.
//! - **Object-safe**: the engine holds an `Arc<dyn TagSource>`.
//! - **Thread-safe**: implementations are `Send + Sync` and synchronize
//!   internally.
//!
//! # Decoding
//!
//! [`decoder_for`] picks the [`RecordDecoder`] for a [`ModuleKind`]:
//!
//! ```
//! use uhfscan_core::{ModuleKind, TagRecord};
//! use uhfscan_hardware::decoder_for;
//!
//! let record = TagRecord::builder("E2801160", "3008").rssi("-61").build().unwrap();
//! let signal = decoder_for(ModuleKind::Slr).signal(&record).unwrap();
//! assert_eq!(signal.dbm, -61);
//! assert_eq!(signal.proximity, 9);
//! ```
//!
//! # Mock Implementations
//!
//! [`mock::MockTagSource`] simulates a reader buffer for development and
//! testing without physical hardware.
//!
//! [`ModuleKind`]: uhfscan_core::ModuleKind

pub mod decoder;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use decoder::{DecimalRssiDecoder, HexRssiDecoder, RecordDecoder, Signal, decoder_for};
pub use error::{HardwareError, Result};
pub use traits::TagSource;
pub use types::{InventoryParams, ReaderInfo, TagProtocol};
