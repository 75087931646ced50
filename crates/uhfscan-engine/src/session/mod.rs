//! Consumer sessions.
//!
//! Each session is a [`ResultSink`](crate::ResultSink) for one screen. The
//! callbacks run on the engine thread, so sessions never touch UI state:
//! they turn loop events into typed updates and send them over an unbounded
//! channel that the UI side drains at its own pace.
//!
//! | Session | Mode | Updates |
//! |---------|------|---------|
//! | [`InventorySession`] | `ContinuousInventory` | [`InventoryUpdate`] |
//! | [`LocateSession`] | `Locate` | [`LocateUpdate`] |
//! | [`LockReadSession`] | `LockRead` | [`LockReadUpdate`] |

pub mod inventory;
pub mod locate;
pub mod lock_read;

pub use inventory::{InventorySession, InventorySummary, InventoryUpdate};
pub use locate::{LocateSession, LocateUpdate};
pub use lock_read::{LockReadSession, LockReadUpdate};

use tokio::sync::mpsc;
use tracing::trace;

/// Send an update, ignoring a receiver that has gone away.
fn forward<T>(updates: &mpsc::UnboundedSender<T>, update: T) {
    if updates.send(update).is_err() {
        trace!("Update receiver dropped");
    }
}
