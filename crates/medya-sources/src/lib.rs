//! Static, read-only catalog of media source definitions.
//!
//! The registry is built once at startup and never mutates. The Tab
//! Manager validates `create_tab` against it and uses it to pick which
//! metadata extractor variant is injected alongside the base Monitor.

pub mod definition;
pub mod registry;

pub use definition::{MediaSourceDefinition, SourceId};
pub use registry::SourceRegistry;
