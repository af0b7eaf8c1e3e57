//! Wire types for the backend-state broadcast.

use std::time::Instant;

use medya_common::TabKey;
use medya_sources::SourceId;
use serde::{Deserialize, Serialize};
use url::Url;

/// Resource tier of one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabStatus {
    /// The one tab the user is looking at.
    Active,
    /// Warm: renderer alive, Monitor running.
    Background,
    /// Renderer destroyed; the tab record and last URL are retained.
    Unloaded,
}

/// One user-visible tab bound to a source and URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub key: TabKey,
    pub source: SourceId,
    pub url: Url,
    pub status: TabStatus,
    pub is_playing: bool,
    pub display_name: String,
    #[serde(skip)]
    pub last_interaction: Instant,
    #[serde(skip)]
    pub last_activated: Instant,
}

impl Tab {
    pub fn new(key: TabKey, source: SourceId, url: Url, display_name: String) -> Self {
        let now = Instant::now();
        Self {
            key,
            source,
            url,
            status: TabStatus::Background,
            is_playing: false,
            display_name,
            last_interaction: now,
            last_activated: now,
        }
    }
}

/// The host's authoritative snapshot of all live tabs. Derived and
/// recomputed, never persisted; `tabs` is in tab-creation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendState {
    pub active_tab: Option<TabKey>,
    pub tabs: Vec<Tab>,
}
