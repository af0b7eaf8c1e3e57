//! The renderer-local page surface the Monitor observes.
//!
//! A `Page` models the parts of a rendered document the Monitor cares
//! about: audio/video elements, the document title, and metadata nodes
//! addressable by selector. Structural changes and title changes are
//! announced over `watch` channels, mirroring the mutation notifications
//! a live document delivers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use url::Url;

/// Signals a media element delivers to its attached listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSignal {
    Play,
    Pause,
    Ended,
}

/// One audio/video element living in a page.
///
/// Listeners are attached once by the Monitor; signals fan out to every
/// attached listener. State transitions that change nothing (pausing an
/// already-paused element) deliver no signal, as in a live document.
#[derive(Debug)]
pub struct MediaElement {
    paused: AtomicBool,
    ended: AtomicBool,
    listeners: Mutex<Vec<mpsc::UnboundedSender<MediaSignal>>>,
}

impl MediaElement {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            paused: AtomicBool::new(true),
            ended: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn play(&self) {
        let was_playing = self.is_playing();
        self.paused.store(false, Ordering::SeqCst);
        self.ended.store(false, Ordering::SeqCst);
        if !was_playing {
            self.notify(MediaSignal::Play);
        }
    }

    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            self.notify(MediaSignal::Pause);
        }
    }

    /// Playback ran to the end of the media.
    pub fn finish(&self) {
        let was_playing = self.is_playing();
        self.paused.store(true, Ordering::SeqCst);
        self.ended.store(true, Ordering::SeqCst);
        if was_playing {
            self.notify(MediaSignal::Ended);
        }
    }

    pub fn is_playing(&self) -> bool {
        !self.paused.load(Ordering::SeqCst) && !self.ended.load(Ordering::SeqCst)
    }

    /// Attach a listener for play/pause/ended signals.
    pub fn attach(&self, listener: mpsc::UnboundedSender<MediaSignal>) {
        self.listeners.lock().unwrap().push(listener);
    }

    fn notify(&self, signal: MediaSignal) {
        // Drop listeners whose receiver is gone (renderer torn down).
        self.listeners
            .lock()
            .unwrap()
            .retain(|tx| tx.send(signal).is_ok());
    }
}

#[derive(Debug)]
struct PageInner {
    url: Url,
    title: String,
    media: Vec<Arc<MediaElement>>,
    nodes: HashMap<String, String>,
}

/// The observable surface of one rendered document.
#[derive(Debug)]
pub struct Page {
    inner: Mutex<PageInner>,
    structure_tx: watch::Sender<u64>,
    title_tx: watch::Sender<u64>,
}

impl Page {
    pub fn new(url: Url) -> Self {
        let (structure_tx, _) = watch::channel(0);
        let (title_tx, _) = watch::channel(0);
        Self {
            inner: Mutex::new(PageInner {
                url,
                title: String::new(),
                media: Vec::new(),
                nodes: HashMap::new(),
            }),
            structure_tx,
            title_tx,
        }
    }

    pub fn url(&self) -> Url {
        self.inner.lock().unwrap().url.clone()
    }

    /// Load a new document: the previous document's elements, nodes and
    /// title are gone.
    pub fn load(&self, url: Url) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.url = url;
            inner.title.clear();
            inner.media.clear();
            inner.nodes.clear();
        }
        self.bump_structure();
        self.bump_title();
    }

    pub fn title(&self) -> String {
        self.inner.lock().unwrap().title.clone()
    }

    /// Set the document title, announcing the change.
    pub fn set_title(&self, title: impl Into<String>) {
        self.inner.lock().unwrap().title = title.into();
        self.bump_title();
    }

    /// Set the document title without announcing it. A replaced `<title>`
    /// element escapes the change notification, which is why the Monitor
    /// also polls.
    pub fn set_title_quiet(&self, title: impl Into<String>) {
        self.inner.lock().unwrap().title = title.into();
    }

    /// Add a media element to the document.
    pub fn insert_media(&self, element: Arc<MediaElement>) {
        self.inner.lock().unwrap().media.push(element);
        self.bump_structure();
    }

    /// Remove a media element from the document. The element may keep
    /// playing in callers still holding it; the document no longer sees it.
    pub fn remove_media(&self, element: &Arc<MediaElement>) {
        self.inner
            .lock()
            .unwrap()
            .media
            .retain(|el| !Arc::ptr_eq(el, element));
        self.bump_structure();
    }

    /// Snapshot of the media elements currently in the document.
    pub fn media_elements(&self) -> Vec<Arc<MediaElement>> {
        self.inner.lock().unwrap().media.clone()
    }

    pub fn any_playing(&self) -> bool {
        self.inner
            .lock()
            .unwrap()
            .media
            .iter()
            .any(|el| el.is_playing())
    }

    /// Pause every media element in the document.
    pub fn pause_all(&self) {
        let media = self.media_elements();
        for el in &media {
            el.pause();
        }
    }

    /// Upsert a metadata node addressable by `selector`.
    pub fn set_node(&self, selector: impl Into<String>, value: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .nodes
            .insert(selector.into(), value.into());
        self.bump_structure();
    }

    /// Exact selector lookup.
    pub fn query(&self, selector: &str) -> Option<String> {
        self.inner.lock().unwrap().nodes.get(selector).cloned()
    }

    /// Substring selector match, the `[class*="fragment"]` escape hatch
    /// for markup whose exact class names churn.
    pub fn query_containing(&self, fragment: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .iter()
            .find(|(selector, _)| selector.contains(fragment))
            .map(|(_, value)| value.clone())
    }

    /// Subscribe to structural-change notifications.
    pub fn watch_structure(&self) -> watch::Receiver<u64> {
        self.structure_tx.subscribe()
    }

    /// Subscribe to title-change notifications.
    pub fn watch_title(&self) -> watch::Receiver<u64> {
        self.title_tx.subscribe()
    }

    fn bump_structure(&self) {
        self.structure_tx.send_modify(|rev| *rev += 1);
    }

    fn bump_title(&self) {
        self.title_tx.send_modify(|rev| *rev += 1);
    }
}
