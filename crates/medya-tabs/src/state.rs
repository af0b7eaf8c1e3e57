//! The serialized host-side tab store.
//!
//! All mutation happens under the manager's mutex; this module is pure
//! data manipulation so the lifecycle rules stay unit-testable without a
//! runtime.

use std::collections::HashMap;
use std::time::Instant;

use medya_common::TabKey;
use medya_renderer::Renderer;
use medya_sources::SourceId;

use crate::types::{BackendState, Tab, TabStatus};

/// One live tab plus its renderer. `renderer` is `None` while the tab is
/// unloaded.
pub(crate) struct TabEntry {
    pub(crate) tab: Tab,
    pub(crate) renderer: Option<Renderer>,
}

pub(crate) struct TabsState {
    pub(crate) tabs: HashMap<TabKey, TabEntry>,
    /// Tab-creation order; drives the broadcast ordering.
    pub(crate) tab_order: Vec<TabKey>,
    pub(crate) active_tab_key: Option<TabKey>,
    pub(crate) playing_tab_key: Option<TabKey>,
}

impl TabsState {
    pub(crate) fn new() -> Self {
        Self {
            tabs: HashMap::new(),
            tab_order: Vec::new(),
            active_tab_key: None,
            playing_tab_key: None,
        }
    }

    pub(crate) fn insert(&mut self, entry: TabEntry) {
        self.tab_order.push(entry.tab.key.clone());
        self.tabs.insert(entry.tab.key.clone(), entry);
    }

    pub(crate) fn remove(&mut self, key: &TabKey) -> Option<TabEntry> {
        let entry = self.tabs.remove(key)?;
        self.tab_order.retain(|k| k != key);
        Some(entry)
    }

    /// The live tab referencing `source`, if any. Callers use this to
    /// enforce single-instance policy.
    pub(crate) fn live_tab_for_source(&self, source: SourceId) -> Option<TabKey> {
        self.tab_order
            .iter()
            .find(|key| {
                self.tabs
                    .get(*key)
                    .is_some_and(|entry| entry.tab.source == source)
            })
            .cloned()
    }

    /// Demote the current Active tab (if any) to Background. Its renderer
    /// keeps running.
    pub(crate) fn demote_active(&mut self) {
        if let Some(key) = self.active_tab_key.take() {
            if let Some(entry) = self.tabs.get_mut(&key) {
                if entry.tab.status == TabStatus::Active {
                    entry.tab.status = TabStatus::Background;
                }
            }
        }
    }

    /// Promote `key` to Active. The caller has already made sure its
    /// renderer is alive and no other tab is Active.
    pub(crate) fn promote(&mut self, key: &TabKey) {
        if let Some(entry) = self.tabs.get_mut(key) {
            let now = Instant::now();
            entry.tab.status = TabStatus::Active;
            entry.tab.last_interaction = now;
            entry.tab.last_activated = now;
            self.active_tab_key = Some(key.clone());
        }
    }

    /// The replacement candidate when the Active tab closes: the most
    /// recently activated remaining Background tab.
    pub(crate) fn most_recently_activated_background(&self) -> Option<TabKey> {
        self.tabs
            .values()
            .filter(|entry| entry.tab.status == TabStatus::Background)
            .max_by_key(|entry| entry.tab.last_activated)
            .map(|entry| entry.tab.key.clone())
    }

    /// Recompute the broadcastable snapshot.
    pub(crate) fn snapshot(&self) -> BackendState {
        BackendState {
            active_tab: self.active_tab_key.clone(),
            tabs: self
                .tab_order
                .iter()
                .filter_map(|key| self.tabs.get(key))
                .map(|entry| entry.tab.clone())
                .collect(),
        }
    }
}
