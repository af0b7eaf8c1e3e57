use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of streaming services the application knows how to host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceId {
    AppleMusic,
    YouTube,
    SoundCloud,
}

impl SourceId {
    pub const ALL: &'static [SourceId] =
        &[SourceId::AppleMusic, SourceId::YouTube, SourceId::SoundCloud];

    /// The wire id, identical to the serde form (e.g. `"appleMusic"`).
    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::AppleMusic => "appleMusic",
            SourceId::YouTube => "youTube",
            SourceId::SoundCloud => "soundCloud",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry describing a streaming service: identity, display
/// metadata, navigation target, and instancing policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSourceDefinition {
    pub id: SourceId,
    pub name: String,
    pub icon_url: String,
    pub default_url: String,
    /// Whether more than one live tab may reference this source.
    pub multi_instance: bool,
    /// Origins this source's renderer may navigate within. Empty means
    /// unrestricted (used by tests; every built-in source restricts).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}
