//! Engine configuration. Every knob has a default so a partial (or
//! absent) config file works out of the box.

use std::time::Duration;

use medya_renderer::MonitorConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between idle sweeps over background tabs.
    pub sweep_interval_secs: u64,
    /// Idle budget in seconds before a background tab is unloaded.
    pub unload_after_secs: u64,
    /// Fallback playback poll inside each renderer, in milliseconds.
    pub playback_poll_ms: u64,
    /// Fallback title poll inside each renderer, in milliseconds.
    pub title_poll_ms: u64,
    /// Capacity of the backend-state broadcast channel.
    pub broadcast_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 30,
            unload_after_secs: 15 * 60,
            playback_poll_ms: 2000,
            title_poll_ms: 3000,
            broadcast_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn unload_after(&self) -> Duration {
        Duration::from_secs(self.unload_after_secs)
    }

    /// The timer knobs handed to each renderer's Monitor.
    pub fn monitor(&self) -> MonitorConfig {
        MonitorConfig {
            playback_poll: Duration::from_millis(self.playback_poll_ms),
            title_poll: Duration::from_millis(self.title_poll_ms),
        }
    }
}
