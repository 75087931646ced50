//! Locate session: follow one tag's signal strength.

use crate::{
    beeper::{ProximityCadence, SoundPlayer},
    sink::ResultSink,
};
use parking_lot::Mutex;
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uhfscan_core::{ModuleKind, TagRecord};
use uhfscan_hardware::{RecordDecoder, Signal, decoder_for};

/// Update produced by a [`LocateSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateUpdate {
    /// A read of the located tag.
    Signal {
        epc: String,
        dbm: i32,
        proximity: u32,
    },

    /// The tag has been silent past the loss threshold.
    Lost,
}

/// Signal tracker for the locate screen.
///
/// Signal strength is decoded with the module's decoder. With a
/// [`SoundPlayer`] attached, reads beep faster the closer the tag is.
pub struct LocateSession {
    decoder: Box<dyn RecordDecoder>,
    cadence: Mutex<ProximityCadence>,
    player: Option<Arc<dyn SoundPlayer>>,
    last_signal: Mutex<Option<Signal>>,
    updates: mpsc::UnboundedSender<LocateUpdate>,
}

impl LocateSession {
    /// Create a session and the receiver for its updates.
    pub fn new(module: ModuleKind) -> (Self, mpsc::UnboundedReceiver<LocateUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let session = Self {
            decoder: decoder_for(module),
            cadence: Mutex::new(ProximityCadence::new()),
            player: None,
            last_signal: Mutex::new(None),
            updates,
        };
        (session, rx)
    }

    /// Beep through `player` at a proximity-dependent pace.
    pub fn with_player(mut self, player: Arc<dyn SoundPlayer>) -> Self {
        self.player = Some(player);
        self
    }

    /// Most recent decoded signal, cleared when the tag is lost.
    pub fn last_signal(&self) -> Option<Signal> {
        *self.last_signal.lock()
    }
}

impl ResultSink for LocateSession {
    fn on_tag(&self, record: &TagRecord) {
        let signal = match self.decoder.signal(record) {
            Ok(signal) => signal,
            Err(e) => {
                debug!(error = %e, "Unreadable signal dropped");
                return;
            }
        };
        *self.last_signal.lock() = Some(signal);

        if let Some(player) = &self.player
            && self.cadence.lock().should_beep(signal.proximity, Instant::now())
        {
            player.play();
        }

        super::forward(
            &self.updates,
            LocateUpdate::Signal {
                epc: record.epc().to_string(),
                dbm: signal.dbm,
                proximity: signal.proximity,
            },
        );
    }

    fn on_rate(&self, reads: u64) {
        trace!(reads, "Rate ignored while locating");
    }

    fn on_tag_lost(&self) {
        *self.last_signal.lock() = None;
        self.cadence.lock().reset();
        super::forward(&self.updates, LocateUpdate::Lost);
    }
}
