//! Session persistence: remember open tabs across runs.
//!
//! The saved shape is `{tabs: [{key, sourceId, url}], activeTab}`. On
//! restore each tab is recreated at its saved URL (minting fresh keys)
//! and the tab that replaced the saved active one is re-activated.
//! Corrupt or missing session files are ignored.

use std::path::{Path, PathBuf};

use medya_common::TabKey;
use medya_sources::SourceId;
use medya_tabs::TabManager;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedTab {
    key: TabKey,
    source_id: SourceId,
    url: Url,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedSession {
    tabs: Vec<SavedTab>,
    active_tab: Option<TabKey>,
}

/// `<data dir>/medya/session.json`.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("medya").join("session.json"))
}

pub fn save_session(manager: &TabManager) {
    if let Some(path) = default_session_path() {
        save_session_to(manager, &path);
    }
}

pub fn save_session_to(manager: &TabManager, path: &Path) {
    let state = manager.get_backend_state();
    let saved = SavedSession {
        tabs: state
            .tabs
            .iter()
            .map(|tab| SavedTab {
                key: tab.key.clone(),
                source_id: tab.source,
                url: tab.url.clone(),
            })
            .collect(),
        active_tab: state.active_tab,
    };

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match serde_json::to_string_pretty(&saved) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                warn!("failed to write session file: {e}");
            }
        }
        Err(e) => warn!("failed to serialize session: {e}"),
    }
}

pub fn restore_session(manager: &TabManager) {
    if let Some(path) = default_session_path() {
        restore_session_from(manager, &path);
    }
}

pub fn restore_session_from(manager: &TabManager, path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let session: SavedSession = match serde_json::from_str(&content) {
        Ok(session) => session,
        Err(e) => {
            warn!("ignoring corrupt session file: {e}");
            return;
        }
    };
    if session.tabs.is_empty() {
        return;
    }

    // Restored tabs get fresh keys; remember which one replaced the
    // previously active tab so it can be re-activated afterwards.
    let mut active_replacement = None;
    for saved in &session.tabs {
        match manager.create_tab_with_url(saved.source_id, Some(saved.url.clone())) {
            Ok(key) => {
                if session.active_tab.as_ref() == Some(&saved.key) {
                    active_replacement = Some(key);
                }
            }
            Err(e) => warn!(source = %saved.source_id, "failed to restore tab: {e}"),
        }
    }
    if let Some(key) = active_replacement {
        let _ = manager.switch_tab(&key);
    }
    debug!(tabs = session.tabs.len(), "session restored");
}
