//! Renderer Instances and the in-renderer Monitor.
//!
//! One `Renderer` is an isolated execution context backing one tab. It
//! owns a [`Page`] surface (media elements, document title, metadata
//! nodes) and a Monitor task observing that surface. In the shipped
//! application the surface is backed by embedded web content; the `Page`
//! type is the injection boundary, and tests drive it directly.
//!
//! All host interaction is message passing: [`RendererCommand`]s inward,
//! [`medya_common::MonitorEvent`]s outward. Renderers share no state with
//! the host or with each other.

pub mod extract;
pub mod instance;
pub mod monitor;
pub mod page;

pub use extract::{extractor_for, MetadataExtractor, TrackMetadata};
pub use instance::{Renderer, RendererCommand};
pub use monitor::MonitorConfig;
pub use page::{MediaElement, MediaSignal, Page};
