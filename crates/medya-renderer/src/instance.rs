//! Host-side handle for one isolated renderer execution context.

use std::sync::Arc;

use medya_common::{MonitorEvent, RendererError, TabKey};
use medya_sources::{MediaSourceDefinition, SourceId};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::extract::extractor_for;
use crate::monitor::{Monitor, MonitorConfig};
use crate::page::{MediaSignal, Page};

/// Commands the host sends into a renderer. Everything inward is
/// asynchronous message passing; the renderer applies commands on its own
/// thread of control.
#[derive(Debug, Clone)]
pub enum RendererCommand {
    /// Load a new URL, discarding the current document.
    Navigate(Url),
    /// Pause every media element in the page.
    PauseMedia,
}

/// One renderer instance: an isolated task owning a [`Page`] with the
/// Monitor injected. Dropping the handle tears the task down.
#[derive(Debug)]
pub struct Renderer {
    key: TabKey,
    source: SourceId,
    page: Arc<Page>,
    commands: mpsc::UnboundedSender<RendererCommand>,
    allowed_origins: Vec<String>,
    cancel: CancellationToken,
}

impl Renderer {
    /// Provision a renderer for `tab_key` navigated to `url`, with the
    /// Monitor bound to `(tab_key, source)` and the source's extractor
    /// variant injected.
    pub fn spawn(
        tab_key: TabKey,
        definition: &MediaSourceDefinition,
        url: Url,
        events: mpsc::UnboundedSender<MonitorEvent>,
        config: MonitorConfig,
    ) -> Result<Self, RendererError> {
        if !origin_allowed(&definition.allowed_origins, &url) {
            return Err(RendererError::NavigationBlocked {
                source_name: definition.id.to_string(),
                url: url.to_string(),
            });
        }

        let page = Arc::new(Page::new(url.clone()));
        let extractor = extractor_for(definition.id);
        let (monitor, signals) = Monitor::new(tab_key.clone(), Arc::clone(&page), extractor, events);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tokio::spawn(run_renderer(
            monitor,
            signals,
            command_rx,
            Arc::clone(&page),
            config,
            cancel.clone(),
        ));
        debug!(tab_key = %tab_key, source = %definition.id, url = %url, "renderer provisioned");

        Ok(Self {
            key: tab_key,
            source: definition.id,
            page,
            commands: command_tx,
            allowed_origins: definition.allowed_origins.clone(),
            cancel,
        })
    }

    pub fn key(&self) -> &TabKey {
        &self.key
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    /// The page surface this renderer hosts. The embedded content drives
    /// it; the host only reads.
    pub fn page(&self) -> Arc<Page> {
        Arc::clone(&self.page)
    }

    /// The URL the page currently shows (tracks in-page navigation).
    pub fn current_url(&self) -> Url {
        self.page.url()
    }

    /// Ask the renderer to load `url`. Fails synchronously if the target
    /// origin is outside the source's allowlist or the renderer is gone.
    pub fn navigate(&self, url: Url) -> Result<(), RendererError> {
        if !origin_allowed(&self.allowed_origins, &url) {
            return Err(RendererError::NavigationBlocked {
                source_name: self.source.to_string(),
                url: url.to_string(),
            });
        }
        self.commands
            .send(RendererCommand::Navigate(url))
            .map_err(|_| RendererError::Terminated(self.key.to_string()))
    }

    /// Ask the renderer to pause all media. Best-effort: a renderer that
    /// is already gone has nothing playing.
    pub fn pause_media(&self) {
        let _ = self.commands.send(RendererCommand::PauseMedia);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn origin_allowed(origins: &[String], url: &Url) -> bool {
    if origins.is_empty() {
        return true;
    }
    let origin = url.origin().ascii_serialization();
    origins.iter().any(|allowed| allowed == &origin)
}

/// The renderer's single thread of control: applies inbound commands and
/// runs the Monitor cooperatively, suspending only at channel and timer
/// readiness.
async fn run_renderer(
    mut monitor: Monitor,
    mut signals: mpsc::UnboundedReceiver<MediaSignal>,
    mut commands: mpsc::UnboundedReceiver<RendererCommand>,
    page: Arc<Page>,
    config: MonitorConfig,
    cancel: CancellationToken,
) {
    let mut structure_rx = page.watch_structure();
    let mut title_rx = page.watch_title();

    let mut playback_tick = time::interval(config.playback_poll);
    playback_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut title_tick = time::interval(config.title_poll);
    title_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Initial scan on load.
    monitor.scan();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            command = commands.recv() => match command {
                Some(RendererCommand::Navigate(url)) => {
                    debug!(url = %url, "renderer navigating");
                    page.load(url);
                }
                Some(RendererCommand::PauseMedia) => page.pause_all(),
                None => break,
            },
            changed = structure_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                // Structural change (SPA navigation and the like): rescan
                // only; emission stays with signals and the fallback poll.
                monitor.scan();
            }
            Some(_signal) = signals.recv() => monitor.publish_playback(),
            changed = title_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                monitor.check_title();
            }
            _ = playback_tick.tick() => {
                monitor.scan();
                monitor.publish_playback();
            }
            _ = title_tick.tick() => monitor.check_title(),
        }
    }
}
