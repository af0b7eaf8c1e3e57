//! The Tab Manager: host-side owner of tab lifecycle.
//!
//! All operations are serialized on one mutex over [`TabsState`]; every
//! successful mutation broadcasts the recomputed [`BackendState`] through
//! the shared bus. The aggregator and the idle sweeper run on their own
//! tasks against the same shared state.

use std::sync::{Arc, Mutex};

use medya_common::{MedyaError, MonitorEvent, RendererError, TabError, TabKey};
use medya_renderer::{Page, Renderer};
use medya_sources::{MediaSourceDefinition, SourceId, SourceRegistry};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::aggregator;
use crate::bus::StateBus;
use crate::config::EngineConfig;
use crate::state::{TabEntry, TabsState};
use crate::tiering;
use crate::types::{BackendState, Tab};

/// State shared between the manager and its background tasks.
pub(crate) struct ManagerShared {
    pub(crate) registry: Arc<SourceRegistry>,
    pub(crate) config: EngineConfig,
    pub(crate) state: Mutex<TabsState>,
    pub(crate) bus: StateBus,
    pub(crate) events_tx: mpsc::UnboundedSender<MonitorEvent>,
}

/// Owner of tab lifecycle: create/switch/close, instancing policy, and
/// resource tiering. The external operation surface of the core.
pub struct TabManager {
    shared: Arc<ManagerShared>,
    cancel: CancellationToken,
}

impl TabManager {
    /// Build a manager over `registry` and start the aggregator and the
    /// idle sweeper. Must be called within a tokio runtime.
    pub fn new(registry: Arc<SourceRegistry>, config: EngineConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let bus = StateBus::new(config.broadcast_capacity);
        let shared = Arc::new(ManagerShared {
            registry,
            config,
            state: Mutex::new(TabsState::new()),
            bus,
            events_tx,
        });
        let cancel = CancellationToken::new();

        tokio::spawn(aggregator::run(
            Arc::clone(&shared),
            events_rx,
            cancel.clone(),
        ));
        tokio::spawn(tiering::run(Arc::clone(&shared), cancel.clone()));

        Self { shared, cancel }
    }

    /// Open a tab for `source` at its default URL and make it Active.
    ///
    /// For a single-instance source that already has a live tab, no
    /// duplicate is created: the existing tab is promoted and its key
    /// returned. That is policy, not an error.
    pub fn create_tab(&self, source: SourceId) -> Result<TabKey, MedyaError> {
        self.create_tab_with_url(source, None)
    }

    /// Like [`create_tab`](Self::create_tab) with an explicit URL, used
    /// by session restore.
    pub fn create_tab_with_url(
        &self,
        source: SourceId,
        url_override: Option<Url>,
    ) -> Result<TabKey, MedyaError> {
        let definition = self.shared.registry.lookup(source)?.clone();
        let url = match url_override {
            Some(url) => url,
            None => Url::parse(&definition.default_url).map_err(RendererError::from)?,
        };

        self.mutate(|state, shared| {
            if !definition.multi_instance {
                if let Some(existing) = state.live_tab_for_source(source) {
                    debug!(source = %source, tab_key = %existing, "single-instance source reactivated");
                    activate_tab(state, &existing, shared)?;
                    return Ok(existing);
                }
            }

            let key = TabKey::mint(definition.id.as_str());
            let renderer = Renderer::spawn(
                key.clone(),
                &definition,
                url.clone(),
                shared.events_tx.clone(),
                shared.config.monitor(),
            )?;

            state.demote_active();
            state.insert(TabEntry {
                tab: Tab::new(key.clone(), source, url, definition.name.clone()),
                renderer: Some(renderer),
            });
            state.promote(&key);
            debug!(tab_key = %key, source = %source, "tab created");
            Ok(key)
        })
    }

    /// Make `key` the Active tab. An Unloaded tab gets its renderer
    /// recreated at its last known URL first.
    pub fn switch_tab(&self, key: &TabKey) -> Result<(), MedyaError> {
        self.mutate(|state, shared| {
            if !state.tabs.contains_key(key) {
                return Err(TabError::UnknownTab(key.to_string()).into());
            }
            activate_tab(state, key, shared)
        })
    }

    /// Close `key`: tear down its renderer and forget the tab. Unknown
    /// keys are a no-op. If the Active tab closes, the most recently
    /// activated remaining Background tab takes over, or the landing
    /// state (`activeTab = null`) is reached.
    pub fn close_tab(&self, key: &TabKey) -> Result<(), MedyaError> {
        if !self.shared.state.lock().unwrap().tabs.contains_key(key) {
            return Ok(());
        }
        self.mutate(|state, _shared| {
            let Some(entry) = state.remove(key) else {
                return Ok(());
            };
            // Dropping the handle cancels the renderer task; events still
            // in flight for this key become stale and get dropped.
            drop(entry);
            debug!(tab_key = %key, "tab closed");

            if state.playing_tab_key.as_ref() == Some(key) {
                state.playing_tab_key = None;
            }
            if state.active_tab_key.as_ref() == Some(key) {
                state.active_tab_key = None;
                if let Some(next) = state.most_recently_activated_background() {
                    state.promote(&next);
                }
            }
            Ok(())
        })
    }

    /// Read-only snapshot of the backend state. No side effects.
    pub fn get_backend_state(&self) -> BackendState {
        self.shared.state.lock().unwrap().snapshot()
    }

    /// The source catalog, in catalog order.
    pub fn get_sources(&self) -> &[MediaSourceDefinition] {
        self.shared.registry.get_sources()
    }

    /// Subscribe to backend-state broadcasts.
    pub fn subscribe(&self) -> broadcast::Receiver<BackendState> {
        self.shared.bus.subscribe()
    }

    /// The page surface behind a loaded tab's renderer, if any. This is
    /// how embedded content (and tests) reach a tab's document.
    pub fn renderer_page(&self, key: &TabKey) -> Option<Arc<Page>> {
        let state = self.shared.state.lock().unwrap();
        state
            .tabs
            .get(key)
            .and_then(|entry| entry.renderer.as_ref())
            .map(Renderer::page)
    }

    /// Stop the aggregator and the idle sweeper. Renderers die with
    /// their entries when the manager is dropped.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Lock, mutate, and broadcast the recomputed snapshot on success.
    fn mutate<F, V>(&self, f: F) -> Result<V, MedyaError>
    where
        F: FnOnce(&mut TabsState, &ManagerShared) -> Result<V, MedyaError>,
    {
        let mut state = self.shared.state.lock().unwrap();
        let value = f(&mut state, &self.shared)?;
        let snapshot = state.snapshot();
        drop(state);
        self.shared.bus.publish(snapshot);
        Ok(value)
    }
}

impl Drop for TabManager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Promote `key` to Active, recreating its renderer first if the tab was
/// unloaded. A failed recreation leaves the tab retained and Unloaded
/// (degraded but retryable) and the previous Active tab in place.
fn activate_tab(
    state: &mut TabsState,
    key: &TabKey,
    shared: &ManagerShared,
) -> Result<(), MedyaError> {
    let source = state
        .tabs
        .get(key)
        .ok_or_else(|| TabError::UnknownTab(key.to_string()))?
        .tab
        .source;
    let definition = shared.registry.lookup(source)?.clone();

    let entry = state
        .tabs
        .get_mut(key)
        .ok_or_else(|| TabError::UnknownTab(key.to_string()))?;
    if entry.renderer.is_none() {
        match Renderer::spawn(
            key.clone(),
            &definition,
            entry.tab.url.clone(),
            shared.events_tx.clone(),
            shared.config.monitor(),
        ) {
            Ok(renderer) => {
                debug!(tab_key = %key, url = %entry.tab.url, "unloaded tab reloaded");
                entry.renderer = Some(renderer);
            }
            Err(error) => {
                warn!(tab_key = %key, %error, "renderer reload failed; tab kept unloaded");
                return Ok(());
            }
        }
    }

    state.demote_active();
    state.promote(key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TabStatus;
    use medya_renderer::MediaElement;
    use std::time::Duration;

    fn manager() -> TabManager {
        TabManager::new(Arc::new(SourceRegistry::builtin()), EngineConfig::default())
    }

    fn tab<'a>(state: &'a BackendState, key: &TabKey) -> &'a Tab {
        state
            .tabs
            .iter()
            .find(|t| &t.key == key)
            .expect("tab missing from snapshot")
    }

    async fn next_state(rx: &mut broadcast::Receiver<BackendState>) -> BackendState {
        tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("timed out waiting for a broadcast")
            .expect("state bus closed")
    }

    async fn wait_for<F>(rx: &mut broadcast::Receiver<BackendState>, predicate: F) -> BackendState
    where
        F: Fn(&BackendState) -> bool,
    {
        loop {
            let state = next_state(rx).await;
            if predicate(&state) {
                return state;
            }
        }
    }

    #[tokio::test]
    async fn create_tab_provisions_an_active_tab() {
        let manager = manager();
        let key = manager.create_tab(SourceId::YouTube).unwrap();

        let state = manager.get_backend_state();
        assert_eq!(state.active_tab, Some(key.clone()));
        assert_eq!(state.tabs.len(), 1);
        assert_eq!(tab(&state, &key).status, TabStatus::Active);
        assert_eq!(tab(&state, &key).display_name, "YouTube");
        assert!(manager.renderer_page(&key).is_some());
    }

    #[tokio::test]
    async fn multi_instance_source_creates_distinct_tabs() {
        let manager = manager();
        let first = manager.create_tab(SourceId::YouTube).unwrap();
        let second = manager.create_tab(SourceId::YouTube).unwrap();
        assert_ne!(first, second);

        let state = manager.get_backend_state();
        assert_eq!(state.tabs.len(), 2);
        assert_eq!(tab(&state, &first).status, TabStatus::Background);
        assert_eq!(tab(&state, &second).status, TabStatus::Active);
    }

    #[tokio::test]
    async fn single_instance_source_reactivates_existing_tab() {
        let manager = manager();
        let apple = manager.create_tab(SourceId::AppleMusic).unwrap();
        let youtube = manager.create_tab(SourceId::YouTube).unwrap();

        let again = manager.create_tab(SourceId::AppleMusic).unwrap();
        assert_eq!(again, apple);

        let state = manager.get_backend_state();
        assert_eq!(state.tabs.len(), 2);
        assert_eq!(state.active_tab, Some(apple.clone()));
        assert_eq!(tab(&state, &apple).status, TabStatus::Active);
        assert_eq!(tab(&state, &youtube).status, TabStatus::Background);

        let apple_count = state
            .tabs
            .iter()
            .filter(|t| t.source == SourceId::AppleMusic)
            .count();
        assert_eq!(apple_count, 1);
    }

    #[tokio::test]
    async fn unknown_source_is_rejected() {
        let manager = TabManager::new(
            Arc::new(SourceRegistry::with_sources(Vec::new())),
            EngineConfig::default(),
        );
        let err = manager.create_tab(SourceId::YouTube).unwrap_err();
        assert!(matches!(err, MedyaError::Source(_)));
    }

    #[tokio::test]
    async fn blocked_default_url_surfaces_as_renderer_error() {
        let definition = MediaSourceDefinition {
            id: SourceId::YouTube,
            name: "YouTube".into(),
            icon_url: "https://app.test/icon.png".into(),
            default_url: "https://evil.test/".into(),
            multi_instance: true,
            allowed_origins: vec!["https://app.test".into()],
        };
        let manager = TabManager::new(
            Arc::new(SourceRegistry::with_sources(vec![definition])),
            EngineConfig::default(),
        );
        let err = manager.create_tab(SourceId::YouTube).unwrap_err();
        assert!(matches!(err, MedyaError::Renderer(_)));
        assert!(manager.get_backend_state().tabs.is_empty());
    }

    #[tokio::test]
    async fn switch_unknown_tab_is_rejected() {
        let manager = manager();
        let err = manager.switch_tab(&TabKey::from("nope")).unwrap_err();
        assert!(matches!(err, MedyaError::Tab(TabError::UnknownTab(_))));
    }

    #[tokio::test]
    async fn switch_swaps_active_and_background() {
        let manager = manager();
        let a = manager.create_tab(SourceId::YouTube).unwrap();
        let b = manager.create_tab(SourceId::YouTube).unwrap();

        manager.switch_tab(&a).unwrap();
        let state = manager.get_backend_state();
        assert_eq!(state.active_tab, Some(a.clone()));
        assert_eq!(tab(&state, &a).status, TabStatus::Active);
        assert_eq!(tab(&state, &b).status, TabStatus::Background);

        manager.switch_tab(&b).unwrap();
        let state = manager.get_backend_state();
        assert_eq!(tab(&state, &a).status, TabStatus::Background);
        assert_eq!(tab(&state, &b).status, TabStatus::Active);
        assert_eq!(state.active_tab, Some(b));
    }

    #[tokio::test]
    async fn close_unknown_tab_is_a_noop() {
        let manager = manager();
        manager.create_tab(SourceId::YouTube).unwrap();
        manager.close_tab(&TabKey::from("nope")).unwrap();
        assert_eq!(manager.get_backend_state().tabs.len(), 1);
    }

    #[tokio::test]
    async fn closing_the_only_tab_reaches_the_landing_state() {
        let manager = manager();
        let key = manager.create_tab(SourceId::YouTube).unwrap();
        manager.close_tab(&key).unwrap();

        let state = manager.get_backend_state();
        assert_eq!(state.active_tab, None);
        assert!(state.tabs.is_empty());
    }

    #[tokio::test]
    async fn closing_the_active_tab_promotes_the_most_recently_activated() {
        let manager = manager();
        let a = manager.create_tab(SourceId::YouTube).unwrap();
        let b = manager.create_tab(SourceId::YouTube).unwrap();
        let c = manager.create_tab(SourceId::YouTube).unwrap();

        // Activation history: a, b, c, then back to a.
        manager.switch_tab(&a).unwrap();
        manager.close_tab(&a).unwrap();

        let state = manager.get_backend_state();
        assert_eq!(state.active_tab, Some(c.clone()));
        assert_eq!(tab(&state, &c).status, TabStatus::Active);
        assert_eq!(tab(&state, &b).status, TabStatus::Background);
    }

    #[tokio::test]
    async fn tabs_stay_in_creation_order_across_closes() {
        let manager = manager();
        let a = manager.create_tab(SourceId::YouTube).unwrap();
        let b = manager.create_tab(SourceId::YouTube).unwrap();
        let c = manager.create_tab(SourceId::YouTube).unwrap();
        let d = manager.create_tab(SourceId::YouTube).unwrap();

        manager.close_tab(&b).unwrap();

        let keys: Vec<TabKey> = manager
            .get_backend_state()
            .tabs
            .iter()
            .map(|t| t.key.clone())
            .collect();
        assert_eq!(keys, vec![a, c, d]);
    }

    #[tokio::test]
    async fn get_backend_state_is_idempotent() {
        let manager = manager();
        manager.create_tab(SourceId::YouTube).unwrap();
        manager.create_tab(SourceId::SoundCloud).unwrap();

        let first = manager.get_backend_state();
        let second = manager.get_backend_state();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn every_mutation_is_broadcast() {
        let manager = manager();
        let mut rx = manager.subscribe();

        let key = manager.create_tab(SourceId::YouTube).unwrap();
        let state = next_state(&mut rx).await;
        assert_eq!(state.active_tab, Some(key.clone()));

        manager.close_tab(&key).unwrap();
        let state = wait_for(&mut rx, |s| s.tabs.is_empty()).await;
        assert_eq!(state.active_tab, None);
    }

    #[tokio::test(start_paused = true)]
    async fn playback_events_flow_into_the_broadcast() {
        let manager = manager();
        let mut rx = manager.subscribe();
        let key = manager.create_tab(SourceId::YouTube).unwrap();

        let page = manager.renderer_page(&key).unwrap();
        let element = MediaElement::new();
        page.insert_media(Arc::clone(&element));
        tokio::time::sleep(Duration::from_millis(10)).await;

        element.play();
        let state = wait_for(&mut rx, |s| {
            s.tabs.iter().any(|t| t.key == key && t.is_playing)
        })
        .await;
        assert!(tab(&state, &key).is_playing);

        element.pause();
        wait_for(&mut rx, |s| s.tabs.iter().any(|t| t.key == key && !t.is_playing)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn playback_is_exclusive_across_tabs() {
        let manager = manager();
        let mut rx = manager.subscribe();
        let a = manager.create_tab(SourceId::YouTube).unwrap();
        let b = manager.create_tab(SourceId::YouTube).unwrap();

        let page_a = manager.renderer_page(&a).unwrap();
        let element_a = MediaElement::new();
        page_a.insert_media(Arc::clone(&element_a));
        let page_b = manager.renderer_page(&b).unwrap();
        let element_b = MediaElement::new();
        page_b.insert_media(Arc::clone(&element_b));
        tokio::time::sleep(Duration::from_millis(10)).await;

        element_a.play();
        wait_for(&mut rx, |s| s.tabs.iter().any(|t| t.key == a && t.is_playing)).await;

        element_b.play();
        let state = wait_for(&mut rx, |s| {
            let a_quiet = s.tabs.iter().any(|t| t.key == a && !t.is_playing);
            let b_playing = s.tabs.iter().any(|t| t.key == b && t.is_playing);
            a_quiet && b_playing
        })
        .await;
        assert!(!element_a.is_playing());
        assert_eq!(
            state.tabs.iter().filter(|t| t.is_playing).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn idle_background_tab_unloads_and_reactivates_at_its_last_url() {
        let config = EngineConfig {
            sweep_interval_secs: 1,
            unload_after_secs: 0,
            ..EngineConfig::default()
        };
        let manager = TabManager::new(Arc::new(SourceRegistry::builtin()), config);
        let mut rx = manager.subscribe();

        let a = manager.create_tab(SourceId::YouTube).unwrap();
        let b = manager.create_tab(SourceId::YouTube).unwrap();

        // In-page navigation inside the background tab.
        let page_a = manager.renderer_page(&a).unwrap();
        page_a.load(Url::parse("https://www.youtube.com/watch?v=abc").unwrap());
        drop(page_a);

        let state = wait_for(&mut rx, |s| {
            s.tabs
                .iter()
                .any(|t| t.key == a && t.status == TabStatus::Unloaded)
        })
        .await;
        assert_eq!(
            tab(&state, &a).url.as_str(),
            "https://www.youtube.com/watch?v=abc"
        );
        assert_eq!(tab(&state, &b).status, TabStatus::Active);
        assert!(manager.renderer_page(&a).is_none());

        // Reactivation transparently reverses the unload.
        manager.switch_tab(&a).unwrap();
        let state = manager.get_backend_state();
        assert_eq!(tab(&state, &a).status, TabStatus::Active);
        let page_a = manager.renderer_page(&a).unwrap();
        assert_eq!(page_a.url().as_str(), "https://www.youtube.com/watch?v=abc");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reload_leaves_the_tab_degraded_but_retained() {
        let config = EngineConfig {
            sweep_interval_secs: 1,
            unload_after_secs: 0,
            ..EngineConfig::default()
        };
        let manager = TabManager::new(Arc::new(SourceRegistry::builtin()), config);
        let mut rx = manager.subscribe();

        let a = manager.create_tab(SourceId::YouTube).unwrap();
        let b = manager.create_tab(SourceId::YouTube).unwrap();

        // The background tab drifted outside its source's allowlist
        // before being unloaded.
        let page_a = manager.renderer_page(&a).unwrap();
        page_a.load(Url::parse("https://evil.test/").unwrap());
        drop(page_a);

        wait_for(&mut rx, |s| {
            s.tabs
                .iter()
                .any(|t| t.key == a && t.status == TabStatus::Unloaded)
        })
        .await;

        // Reload fails; the tab is retained, the active tab unchanged.
        manager.switch_tab(&a).unwrap();
        let state = manager.get_backend_state();
        assert_eq!(tab(&state, &a).status, TabStatus::Unloaded);
        assert_eq!(state.active_tab, Some(b));
        assert_eq!(state.tabs.len(), 2);
    }
}
