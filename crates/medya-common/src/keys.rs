use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, globally unique identifier for one tab.
///
/// Keys are minted as `<source-id>-<8 hex chars>` so log lines stay
/// readable, but nothing outside this module should parse them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabKey(String);

impl TabKey {
    /// Mint a fresh key for a tab of the given source.
    pub fn mint(source_id: &str) -> Self {
        let uuid = uuid::Uuid::new_v4();
        let bytes = uuid.as_bytes();
        Self(format!(
            "{source_id}-{:02x}{:02x}{:02x}{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TabKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_is_unique() {
        let a = TabKey::mint("youTube");
        let b = TabKey::mint("youTube");
        assert_ne!(a, b);
    }

    #[test]
    fn mint_prefixes_source_id() {
        let key = TabKey::mint("soundCloud");
        assert!(key.as_str().starts_with("soundCloud-"));
    }

    #[test]
    fn mint_suffix_is_hex() {
        let key = TabKey::mint("appleMusic");
        let suffix = key.as_str().rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn display_matches_as_str() {
        let key = TabKey::mint("youTube");
        assert_eq!(key.to_string(), key.as_str());
    }

    #[test]
    fn serializes_transparently() {
        let key = TabKey::from("youTube-deadbeef");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"youTube-deadbeef\"");

        let back: TabKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn usable_as_map_key() {
        use std::collections::HashSet;
        let key = TabKey::mint("youTube");
        let mut set = HashSet::new();
        set.insert(key.clone());
        set.insert(key);
        assert_eq!(set.len(), 1);
    }
}
