//! Host-side orchestration: the Tab Manager, the State Aggregator, and
//! the backend-state broadcast.
//!
//! The [`TabManager`] owns tab lifecycle (create/switch/close), enforces
//! per-source instancing policy, and tiers resource usage across
//! active/background/unloaded tabs. The Aggregator folds Monitor events
//! from every live renderer into one canonical [`BackendState`] snapshot,
//! broadcast to subscribers after every state-affecting change.

pub mod bus;
pub mod config;
pub mod manager;
pub mod types;

mod aggregator;
mod state;
mod tiering;

pub use bus::StateBus;
pub use config::EngineConfig;
pub use manager::TabManager;
pub use types::{BackendState, Tab, TabStatus};
