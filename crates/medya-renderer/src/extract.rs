//! Source-specific metadata extraction.
//!
//! Third-party markup is unversioned and changes without notice, so each
//! extractor tries an ordered list of strategies per field: the exact
//! class the markup uses today, then an attribute-substring match that
//! survives class-name churn, then the page-level default.

use std::sync::Arc;

use medya_sources::SourceId;

use crate::page::Page;

/// What an extractor pulled out of the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub artwork_url: Option<String>,
}

/// One way of locating a metadata field in the page.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    /// Exact selector for the current markup.
    Css(&'static str),
    /// Match any node whose selector contains this fragment.
    AttrContains(&'static str),
    /// Fall back to the document title.
    PageTitle,
}

fn resolve(page: &Page, strategies: &[Strategy]) -> Option<String> {
    for strategy in strategies {
        let found = match strategy {
            Strategy::Css(selector) => page.query(selector),
            Strategy::AttrContains(fragment) => page.query_containing(fragment),
            Strategy::PageTitle => {
                let title = page.title();
                (!title.is_empty()).then_some(title)
            }
        };
        match found {
            Some(value) if !value.is_empty() => return Some(value),
            _ => {}
        }
    }
    None
}

/// Capability interface for per-source metadata extraction. One variant
/// per source; the host selects which one is injected with the Monitor.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, page: &Page) -> TrackMetadata;
}

/// Default variant: page title only.
pub struct PageTitleExtractor;

impl MetadataExtractor for PageTitleExtractor {
    fn extract(&self, page: &Page) -> TrackMetadata {
        TrackMetadata {
            title: resolve(page, &[Strategy::PageTitle]),
            ..TrackMetadata::default()
        }
    }
}

struct AppleMusicExtractor;

impl MetadataExtractor for AppleMusicExtractor {
    fn extract(&self, page: &Page) -> TrackMetadata {
        TrackMetadata {
            title: resolve(
                page,
                &[
                    Strategy::Css(".web-chrome-playback-lcd__song-name-scroll-inner"),
                    Strategy::AttrContains("song-name"),
                    Strategy::PageTitle,
                ],
            ),
            artist: resolve(
                page,
                &[
                    Strategy::Css(".web-chrome-playback-lcd__sub-copy-scroll-inner"),
                    Strategy::AttrContains("sub-copy"),
                ],
            ),
            artwork_url: resolve(
                page,
                &[
                    Strategy::Css(".web-chrome-playback-lcd__artwork source"),
                    Strategy::AttrContains("artwork"),
                ],
            ),
        }
    }
}

struct YouTubeExtractor;

impl MetadataExtractor for YouTubeExtractor {
    fn extract(&self, page: &Page) -> TrackMetadata {
        let title = resolve(
            page,
            &[
                Strategy::Css("#info h1 yt-formatted-string"),
                Strategy::Css("h1.ytd-watch-metadata yt-formatted-string"),
                Strategy::Css("#title h1 yt-formatted-string"),
                Strategy::PageTitle,
            ],
        )
        .map(|t| t.trim_end_matches(" - YouTube").to_string());

        TrackMetadata {
            title,
            artist: resolve(
                page,
                &[
                    Strategy::Css("#owner ytd-channel-name yt-formatted-string a"),
                    Strategy::Css("#channel-name a"),
                    Strategy::AttrContains("channel-name"),
                ],
            ),
            artwork_url: resolve(page, &[Strategy::Css("meta[property=\"og:image\"]")]),
        }
    }
}

struct SoundCloudExtractor;

impl MetadataExtractor for SoundCloudExtractor {
    fn extract(&self, page: &Page) -> TrackMetadata {
        TrackMetadata {
            title: resolve(
                page,
                &[
                    Strategy::Css(".playbackSoundBadge__titleLink"),
                    Strategy::AttrContains("titleLink"),
                    Strategy::PageTitle,
                ],
            ),
            artist: resolve(
                page,
                &[
                    Strategy::Css(".playbackSoundBadge__lightLink"),
                    Strategy::AttrContains("lightLink"),
                ],
            ),
            artwork_url: resolve(
                page,
                &[
                    Strategy::Css(".playbackSoundBadge__avatar .image span"),
                    Strategy::AttrContains("avatar"),
                ],
            ),
        }
    }
}

/// Select the extractor variant for a source. Chosen by the host at
/// injection time from the Source Registry.
pub fn extractor_for(source: SourceId) -> Arc<dyn MetadataExtractor> {
    match source {
        SourceId::AppleMusic => Arc::new(AppleMusicExtractor),
        SourceId::YouTube => Arc::new(YouTubeExtractor),
        SourceId::SoundCloud => Arc::new(SoundCloudExtractor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page() -> Page {
        Page::new(Url::parse("https://app.test/").unwrap())
    }

    #[test]
    fn apple_music_prefers_exact_markup() {
        let page = page();
        page.set_title("Apple Music");
        page.set_node(".web-chrome-playback-lcd__song-name-scroll-inner", "Song A");
        page.set_node(".web-chrome-playback-lcd__sub-copy-scroll-inner", "Artist A");

        let meta = extractor_for(SourceId::AppleMusic).extract(&page);
        assert_eq!(meta.title.as_deref(), Some("Song A"));
        assert_eq!(meta.artist.as_deref(), Some("Artist A"));
        assert_eq!(meta.artwork_url, None);
    }

    #[test]
    fn apple_music_falls_back_to_attribute_match() {
        let page = page();
        // Markup shipped with a new class suffix; the fragment still matches.
        page.set_node(".lcd-2024__song-name-v2", "Song B");
        let meta = extractor_for(SourceId::AppleMusic).extract(&page);
        assert_eq!(meta.title.as_deref(), Some("Song B"));
    }

    #[test]
    fn apple_music_falls_back_to_page_title() {
        let page = page();
        page.set_title("Song C — Apple Music");
        let meta = extractor_for(SourceId::AppleMusic).extract(&page);
        assert_eq!(meta.title.as_deref(), Some("Song C — Apple Music"));
    }

    #[test]
    fn youtube_strips_site_suffix_from_page_title() {
        let page = page();
        page.set_title("Some Video - YouTube");
        let meta = extractor_for(SourceId::YouTube).extract(&page);
        assert_eq!(meta.title.as_deref(), Some("Some Video"));
    }

    #[test]
    fn youtube_reads_watch_metadata_and_artwork() {
        let page = page();
        page.set_node("#info h1 yt-formatted-string", "Video Title");
        page.set_node("#owner ytd-channel-name yt-formatted-string a", "Channel");
        page.set_node("meta[property=\"og:image\"]", "https://i.ytimg.com/vi/x.jpg");

        let meta = extractor_for(SourceId::YouTube).extract(&page);
        assert_eq!(meta.title.as_deref(), Some("Video Title"));
        assert_eq!(meta.artist.as_deref(), Some("Channel"));
        assert_eq!(
            meta.artwork_url.as_deref(),
            Some("https://i.ytimg.com/vi/x.jpg")
        );
    }

    #[test]
    fn soundcloud_reads_playback_badge() {
        let page = page();
        page.set_node(".playbackSoundBadge__titleLink", "Mix");
        page.set_node(".playbackSoundBadge__lightLink", "Uploader");
        let meta = extractor_for(SourceId::SoundCloud).extract(&page);
        assert_eq!(meta.title.as_deref(), Some("Mix"));
        assert_eq!(meta.artist.as_deref(), Some("Uploader"));
    }

    #[test]
    fn default_extractor_is_title_only() {
        let page = page();
        page.set_title("Somewhere");
        let meta = PageTitleExtractor.extract(&page);
        assert_eq!(meta.title.as_deref(), Some("Somewhere"));
        assert_eq!(meta.artist, None);
        assert_eq!(meta.artwork_url, None);
    }

    #[test]
    fn empty_page_yields_empty_metadata() {
        let page = page();
        let meta = PageTitleExtractor.extract(&page);
        assert_eq!(meta, TrackMetadata::default());
    }
}
