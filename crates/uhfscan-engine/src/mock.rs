//! Recording sink for testing and development.
//!
//! [`RecordingSink`] stores every callback it receives so that tests can
//! assert on the exact event sequence the loop produced.

use crate::sink::ResultSink;
use parking_lot::Mutex;
use uhfscan_core::TagRecord;

/// One callback received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Tag(TagRecord),
    Rate(u64),
    Lost,
    SessionEnd,
}

/// Sink that records every callback in arrival order.
///
/// # Examples
///
/// ```
/// use uhfscan_engine::ResultSink;
/// use uhfscan_engine::mock::{RecordingSink, SinkEvent};
///
/// let sink = RecordingSink::new();
/// sink.on_rate(12);
/// sink.on_tag_lost();
///
/// assert_eq!(sink.events(), vec![SinkEvent::Rate(12), SinkEvent::Lost]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all events so far.
    pub fn take(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// TIDs of the records delivered through `on_tag`.
    pub fn tag_ids(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Tag(record) => Some(record.tid().to_string()),
                _ => None,
            })
            .collect()
    }

    /// Counts delivered through `on_rate`.
    pub fn rates(&self) -> Vec<u64> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Rate(reads) => Some(*reads),
                _ => None,
            })
            .collect()
    }

    /// Number of `on_tag_lost` callbacks.
    pub fn lost_count(&self) -> usize {
        self.count(|event| matches!(event, SinkEvent::Lost))
    }

    /// Number of `on_session_end` callbacks.
    pub fn session_ends(&self) -> usize {
        self.count(|event| matches!(event, SinkEvent::SessionEnd))
    }

    fn count(&self, predicate: impl Fn(&SinkEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| predicate(event)).count()
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().push(event);
    }
}

impl ResultSink for RecordingSink {
    fn on_tag(&self, record: &TagRecord) {
        self.push(SinkEvent::Tag(record.clone()));
    }

    fn on_rate(&self, reads: u64) {
        self.push(SinkEvent::Rate(reads));
    }

    fn on_tag_lost(&self) {
        self.push(SinkEvent::Lost);
    }

    fn on_session_end(&self) {
        self.push(SinkEvent::SessionEnd);
    }
}
