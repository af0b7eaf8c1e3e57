//! The deduplicating sink between playback producers and the host.

use medya_common::{MonitorEvent, PlaybackEvent, TabKey};
use tokio::sync::mpsc;

use crate::extract::TrackMetadata;

/// Both playback producers (native element listeners and the fallback
/// poll) feed this sink. The sink, not the producers, owns the
/// emit-only-on-change decision, so the poll never floods the host.
pub(crate) struct PlaybackSink {
    tab_key: TabKey,
    last: Option<PlaybackEvent>,
    events: mpsc::UnboundedSender<MonitorEvent>,
}

impl PlaybackSink {
    pub(crate) fn new(tab_key: TabKey, events: mpsc::UnboundedSender<MonitorEvent>) -> Self {
        Self {
            tab_key,
            last: None,
            events,
        }
    }

    /// Forward the snapshot if it differs structurally from the last one
    /// emitted. Returns whether an event went out.
    pub(crate) fn offer(&mut self, playing: bool, metadata: TrackMetadata) -> bool {
        let event = PlaybackEvent {
            tab_key: self.tab_key.clone(),
            playing,
            title: metadata.title,
            artist: metadata.artist,
            artwork_url: metadata.artwork_url,
        };

        if self.last.as_ref() == Some(&event) {
            return false;
        }
        self.last = Some(event.clone());
        let _ = self.events.send(MonitorEvent::Playback(event));
        true
    }
}
