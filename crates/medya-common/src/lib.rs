//! Shared types for the medya orchestration core: tab keys, Monitor
//! event messages, and the error taxonomy used across crates.

pub mod errors;
pub mod events;
pub mod keys;

pub use errors::{ConfigError, MedyaError, RendererError, SourceError, TabError};
pub use events::{MonitorEvent, PlaybackEvent, TitleEvent};
pub use keys::TabKey;
