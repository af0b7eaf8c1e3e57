//! The State Aggregator: folds Monitor events from every live renderer
//! into the canonical backend state.
//!
//! One task consumes the shared event channel, so per-tab application
//! order is the per-tab emission order. Events attributed to a key that
//! is no longer live are dropped.

use std::sync::Arc;
use std::time::Instant;

use medya_common::MonitorEvent;
use medya_sources::SourceRegistry;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::manager::ManagerShared;
use crate::state::TabsState;

pub(crate) async fn run(
    shared: Arc<ManagerShared>,
    mut events: mpsc::UnboundedReceiver<MonitorEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                let snapshot = {
                    let mut state = shared.state.lock().unwrap();
                    if !apply_event(&mut state, &shared.registry, event) {
                        continue;
                    }
                    state.snapshot()
                };
                shared.bus.publish(snapshot);
            }
        }
    }
}

/// Fold one event into the tab store. Returns whether anything changed
/// worth broadcasting.
pub(crate) fn apply_event(
    state: &mut TabsState,
    registry: &SourceRegistry,
    event: MonitorEvent,
) -> bool {
    match event {
        MonitorEvent::Playback(playback) => {
            let key = playback.tab_key;
            let Some(entry) = state.tabs.get_mut(&key) else {
                debug!(tab_key = %key, "stale playback event dropped");
                return false;
            };
            entry.tab.is_playing = playback.playing;
            // An audibly active tab is not idle, whatever its tier.
            entry.tab.last_interaction = Instant::now();

            if playback.playing {
                // Exclusive playback: everything else audible gets paused.
                for (other_key, other) in &state.tabs {
                    if other_key == &key {
                        continue;
                    }
                    if let Some(renderer) = &other.renderer {
                        renderer.pause_media();
                    }
                }
                state.playing_tab_key = Some(key);
            } else if state.playing_tab_key.as_ref() == Some(&key) {
                state.playing_tab_key = None;
            }
            true
        }
        MonitorEvent::Title(title) => {
            let Some(entry) = state.tabs.get_mut(&title.tab_key) else {
                debug!(tab_key = %title.tab_key, "stale title event dropped");
                return false;
            };
            // Single-instance tabs keep their catalog name; only
            // multi-instance tabs take the page's title.
            let Some(definition) = registry.get(entry.tab.source) else {
                return false;
            };
            if !definition.multi_instance {
                return false;
            }
            let cleaned = clean_page_title(&title.title, &definition.name);
            if cleaned.is_empty() || cleaned == entry.tab.display_name {
                return false;
            }
            debug!(tab_key = %title.tab_key, display_name = %cleaned, "tab renamed");
            entry.tab.display_name = cleaned;
            true
        }
    }
}

/// Strip the site-name suffix services append to their document titles.
fn clean_page_title(title: &str, source_name: &str) -> String {
    title
        .trim_end_matches(&format!(" - {source_name}"))
        .trim_end_matches(&format!(" | {source_name}"))
        .trim_end_matches(&format!(" — {source_name}"))
        .trim()
        .to_string()
}
