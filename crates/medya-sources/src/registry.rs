use medya_common::SourceError;

use crate::definition::{MediaSourceDefinition, SourceId};

/// The read-only source catalog, built once and owned for the process
/// lifetime. Iteration order is the catalog order shown to subscribers.
pub struct SourceRegistry {
    sources: Vec<MediaSourceDefinition>,
}

impl SourceRegistry {
    /// The built-in catalog of supported streaming services.
    pub fn builtin() -> Self {
        Self {
            sources: vec![
                MediaSourceDefinition {
                    id: SourceId::AppleMusic,
                    name: "Apple Music".into(),
                    icon_url: "https://music.apple.com/assets/favicon/favicon-180.png".into(),
                    default_url: "https://music.apple.com".into(),
                    multi_instance: false,
                    allowed_origins: vec![
                        "https://music.apple.com".into(),
                        "https://appleid.apple.com".into(),
                        "https://idmsa.apple.com".into(),
                    ],
                },
                MediaSourceDefinition {
                    id: SourceId::YouTube,
                    name: "YouTube".into(),
                    icon_url: "https://www.youtube.com/img/favicon_144.png".into(),
                    default_url: "https://www.youtube.com".into(),
                    multi_instance: true,
                    allowed_origins: vec![
                        "https://www.youtube.com".into(),
                        "https://youtube.com".into(),
                        "https://accounts.google.com".into(),
                        "https://accounts.youtube.com".into(),
                        "https://consent.youtube.com".into(),
                        "https://consent.google.com".into(),
                        "https://myaccount.google.com".into(),
                    ],
                },
                MediaSourceDefinition {
                    id: SourceId::SoundCloud,
                    name: "SoundCloud".into(),
                    icon_url: "https://a-v2.sndcdn.com/assets/images/sc-icons/favicon-2cadd14bdb.ico"
                        .into(),
                    default_url: "https://soundcloud.com".into(),
                    multi_instance: false,
                    allowed_origins: vec![
                        "https://soundcloud.com".into(),
                        "https://secure.soundcloud.com".into(),
                        "https://api-v2.soundcloud.com".into(),
                        "https://accounts.google.com".into(),
                    ],
                },
            ],
        }
    }

    /// Build a registry from an explicit catalog. Order is preserved.
    pub fn with_sources(sources: Vec<MediaSourceDefinition>) -> Self {
        Self { sources }
    }

    /// The full catalog, in catalog order.
    pub fn get_sources(&self) -> &[MediaSourceDefinition] {
        &self.sources
    }

    pub fn get(&self, id: SourceId) -> Option<&MediaSourceDefinition> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Like [`get`](Self::get), but a miss is an `UnknownSource` error.
    pub fn lookup(&self, id: SourceId) -> Result<&MediaSourceDefinition, SourceError> {
        self.get(id)
            .ok_or_else(|| SourceError::UnknownSource(id.to_string()))
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
