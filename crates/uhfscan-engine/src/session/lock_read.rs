//! Lock/read session: raw records for the tag access screen.

use crate::sink::ResultSink;
use tokio::sync::mpsc;
use tracing::trace;
use uhfscan_core::TagRecord;

/// Update produced by a [`LockReadSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockReadUpdate {
    Tag(TagRecord),
}

/// Forwards every record unchanged.
#[derive(Debug)]
pub struct LockReadSession {
    updates: mpsc::UnboundedSender<LockReadUpdate>,
}

impl LockReadSession {
    /// Create a session and the receiver for its updates.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LockReadUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        (Self { updates }, rx)
    }
}

impl ResultSink for LockReadSession {
    fn on_tag(&self, record: &TagRecord) {
        super::forward(&self.updates, LockReadUpdate::Tag(record.clone()));
    }

    fn on_rate(&self, reads: u64) {
        trace!(reads, "Rate ignored in lock-read");
    }

    fn on_tag_lost(&self) {}
}
