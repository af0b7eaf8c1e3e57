//! Ephemeral messages emitted by a renderer's Monitor toward the host.
//!
//! Each message is produced inside one renderer, consumed exactly once by
//! the State Aggregator, and never stored.

use serde::{Deserialize, Serialize};

use crate::keys::TabKey;

/// A playback snapshot change detected inside one renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackEvent {
    pub tab_key: TabKey,
    pub playing: bool,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub artwork_url: Option<String>,
}

/// A document-title change detected inside one renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleEvent {
    pub tab_key: TabKey,
    pub title: String,
}

/// Union of everything a Monitor can report, delivered to the Aggregator
/// over one channel so per-tab emission order is preserved.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Playback(PlaybackEvent),
    Title(TitleEvent),
}

impl MonitorEvent {
    /// The tab this event is attributed to.
    pub fn tab_key(&self) -> &TabKey {
        match self {
            MonitorEvent::Playback(e) => &e.tab_key,
            MonitorEvent::Title(e) => &e.tab_key,
        }
    }
}
