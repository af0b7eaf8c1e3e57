//! Resource tiering: demote idle background tabs to Unloaded.
//!
//! Runs opportunistically on its own task; never blocks foreground
//! operations. Active and currently-playing tabs are never swept.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::manager::ManagerShared;
use crate::state::TabsState;
use crate::types::TabStatus;

pub(crate) async fn run(shared: Arc<ManagerShared>, cancel: CancellationToken) {
    let mut tick = time::interval(shared.config.sweep_interval());
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                let snapshot = {
                    let mut state = shared.state.lock().unwrap();
                    if !sweep_idle(&mut state, Instant::now(), shared.config.unload_after()) {
                        continue;
                    }
                    state.snapshot()
                };
                shared.bus.publish(snapshot);
            }
        }
    }
}

/// Unload every background tab idle past its budget, capturing the live
/// URL back into the tab record first so reactivation lands where the
/// user left off. Returns whether anything changed.
pub(crate) fn sweep_idle(state: &mut TabsState, now: Instant, unload_after: Duration) -> bool {
    let active = state.active_tab_key.clone();
    let mut changed = false;

    for (key, entry) in state.tabs.iter_mut() {
        if Some(key) == active.as_ref()
            || entry.tab.is_playing
            || entry.tab.status == TabStatus::Unloaded
        {
            continue;
        }
        if now.duration_since(entry.tab.last_interaction) < unload_after {
            continue;
        }

        if let Some(renderer) = entry.renderer.take() {
            entry.tab.url = renderer.current_url();
        }
        entry.tab.status = TabStatus::Unloaded;
        changed = true;
        debug!(tab_key = %key, "idle background tab unloaded");
    }

    changed
}
