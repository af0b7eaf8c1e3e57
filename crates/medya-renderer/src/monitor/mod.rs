//! The in-renderer Monitor: observes a page's media and title state and
//! reports changes outward.
//!
//! A Monitor is injected once per renderer, bound to that tab's key and
//! source. All of its mutable tracking state (the instrumented-element
//! set and the last-emitted snapshot) lives in the Monitor instance,
//! whose lifetime equals the renderer's.

use std::sync::{Arc, Weak};
use std::time::Duration;

use medya_common::{MonitorEvent, TabKey, TitleEvent};
use tokio::sync::mpsc;
use tracing::debug;

use crate::extract::MetadataExtractor;
use crate::page::{MediaElement, MediaSignal, Page};

mod sink;

use sink::PlaybackSink;


/// Timer knobs for one Monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Fallback rescan/recompute interval for playback state.
    pub playback_poll: Duration,
    /// Fallback poll for document-title changes.
    pub title_poll: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            playback_poll: Duration::from_secs(2),
            title_poll: Duration::from_secs(3),
        }
    }
}

pub(crate) struct Monitor {
    tab_key: TabKey,
    page: Arc<Page>,
    extractor: Arc<dyn MetadataExtractor>,
    /// Non-owning membership set of already-instrumented elements.
    /// Elements the document dropped die with their last `Arc` and are
    /// pruned here on the next scan.
    tracked: Vec<Weak<MediaElement>>,
    signal_tx: mpsc::UnboundedSender<MediaSignal>,
    sink: PlaybackSink,
    last_title: Option<String>,
    events: mpsc::UnboundedSender<MonitorEvent>,
}

impl Monitor {
    pub(crate) fn new(
        tab_key: TabKey,
        page: Arc<Page>,
        extractor: Arc<dyn MetadataExtractor>,
        events: mpsc::UnboundedSender<MonitorEvent>,
    ) -> (Self, mpsc::UnboundedReceiver<MediaSignal>) {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let monitor = Self {
            sink: PlaybackSink::new(tab_key.clone(), events.clone()),
            tab_key,
            page,
            extractor,
            tracked: Vec::new(),
            signal_tx,
            last_title: None,
            events,
        };
        (monitor, signal_rx)
    }

    /// Rescan the page for media elements, instrumenting each newly found
    /// one exactly once.
    pub(crate) fn scan(&mut self) {
        self.tracked.retain(|weak| weak.strong_count() > 0);

        for element in self.page.media_elements() {
            if self.is_tracked(&element) {
                continue;
            }
            element.attach(self.signal_tx.clone());
            self.tracked.push(Arc::downgrade(&element));
            debug!(tab_key = %self.tab_key, "media element instrumented");
        }
    }

    fn is_tracked(&self, element: &Arc<MediaElement>) -> bool {
        self.tracked
            .iter()
            .filter_map(Weak::upgrade)
            .any(|tracked| Arc::ptr_eq(&tracked, element))
    }

    /// Recompute the playback snapshot and offer it to the dedup sink.
    pub(crate) fn publish_playback(&mut self) {
        let playing = self.page.any_playing();
        let metadata = self.extractor.extract(&self.page);
        if self.sink.offer(playing, metadata) {
            debug!(tab_key = %self.tab_key, playing, "playback state emitted");
        }
    }

    /// Emit a TitleEvent if the document title changed since last seen.
    pub(crate) fn check_title(&mut self) {
        let title = self.page.title();
        if title.is_empty() || self.last_title.as_deref() == Some(title.as_str()) {
            return;
        }
        self.last_title = Some(title.clone());
        let _ = self.events.send(MonitorEvent::Title(TitleEvent {
            tab_key: self.tab_key.clone(),
            title,
        }));
    }

    #[cfg(test)]
    pub(crate) fn tracked_len(&self) -> usize {
        self.tracked.len()
    }
}
