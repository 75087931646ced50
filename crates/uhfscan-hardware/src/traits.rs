//! Reader driver trait definitions.
//!
//! This module defines the contract between the inventory engine and the
//! vendor reader driver. The driver decodes the air protocol itself and
//! buffers decoded records; the engine only drains that buffer.
//!
//! Unlike request/response peripherals, the reader buffer is drained by a
//! polling loop on a dedicated thread, so the methods here are plain,
//! non-blocking calls. That keeps the trait object-safe: the engine holds an
//! `Arc<dyn TagSource>` and shares it with the thread that starts and stops
//! inventory rounds.

use crate::error::Result;
use crate::types::{InventoryParams, ReaderInfo};
use uhfscan_core::{ModuleKind, TagRecord};

/// UHF reader driver abstraction.
///
/// Implementations must be internally synchronized: the inventory loop
/// calls [`read_next_tag`](TagSource::read_next_tag) from its own thread
/// while the application starts and stops rounds from another.
///
/// # Examples
///
/// ```
/// use uhfscan_core::TagRecord;
/// use uhfscan_hardware::TagSource;
///
/// fn drain<S: TagSource + ?Sized>(source: &S) -> Vec<TagRecord> {
///     std::iter::from_fn(|| source.read_next_tag()).collect()
/// }
/// ```
pub trait TagSource: Send + Sync {
    /// Take the next decoded record from the reader buffer.
    ///
    /// Never blocks. `None` means the buffer is currently empty, which is
    /// the normal steady state and not an error.
    fn read_next_tag(&self) -> Option<TagRecord>;

    /// Start an inventory round with the given parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader refuses to start, for example because
    /// the module is not powered or the parameters are rejected.
    fn start_inventory(&self, params: &InventoryParams) -> Result<()>;

    /// Stop the running inventory round.
    ///
    /// Returns `true` if the reader acknowledged the stop.
    fn stop_inventory(&self) -> bool;

    /// Module family of the connected reader.
    fn module(&self) -> ModuleKind;

    /// Reader metadata.
    fn reader_info(&self) -> ReaderInfo {
        ReaderInfo::new(self.module().name(), self.module())
    }
}
